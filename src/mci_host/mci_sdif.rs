//! Hosts of all SDIF controllers brought up by the driver
use alloc::{boxed::Box, collections::btree_map::BTreeMap, sync::Arc};
use kspin::SpinNoIrq;
use log::{error, info};

use super::{MCIHost, MCIHostError, MCIHostPlatform, MCIHostStatus};
use crate::mci::{MCIHal, MCIId};

static SDIF_HOSTS: SpinNoIrq<BTreeMap<MCIId, Arc<MCIHost>>> = SpinNoIrq::new(BTreeMap::new());

/// Initialize controller `id` and make its host available to [`sdif_host`]
pub fn sdif_host_init(
    id: MCIId,
    hal: Box<dyn MCIHal>,
    platform: MCIHostPlatform,
) -> MCIHostStatus<Arc<MCIHost>> {
    if SDIF_HOSTS.lock().contains_key(&id) {
        error!("SDIF{:?} already initialized", id);
        return Err(MCIHostError::AlreadyInit);
    }

    let host = match MCIHost::new(id, hal, platform) {
        Ok(host) => Arc::new(host),
        Err(err) => {
            error!("fsdif_ctrl_init() failed: {:?}", err);
            return Err(err);
        }
    };

    let mut hosts = SDIF_HOSTS.lock();
    if hosts.contains_key(&id) {
        error!("SDIF{:?} initialized concurrently", id);
        return Err(MCIHostError::AlreadyInit);
    }
    hosts.insert(id, host.clone());
    drop(hosts);

    info!("SDIF{:?} host registered", id);
    Ok(host)
}

/// Host of controller `id`, if it has been initialized
pub fn sdif_host(id: MCIId) -> Option<Arc<MCIHost>> {
    SDIF_HOSTS.lock().get(&id).cloned()
}

/// Forget the host of controller `id`
///
/// The host is freed once the last outstanding reference is dropped.
pub fn sdif_host_remove(id: MCIId) -> Option<Arc<MCIHost>> {
    SDIF_HOSTS.lock().remove(&id)
}

use super::constants::*;

const FSDIF0_BASE_ADDR: usize = 0x2800_0000;
const FSDIF1_BASE_ADDR: usize = 0x2800_1000;
const FSDIF0_IRQ_NUM: u32 = 104;
const FSDIF1_IRQ_NUM: u32 = 105;

#[derive(Debug, PartialEq, Clone)]
pub struct MCIConfig {
    instance_id: MCIId,       /* Device instance id */
    base_addr: usize,         /* Device register base address */
    irq_num: u32,             /* Device IRQ number */
    trans_mode: MCITransMode, /* Trans mode, PIO/DMA */
    non_removable: bool,      /* Non-removable media, e.g. eMMC */
}

impl MCIConfig {
    pub fn new(instance_id: MCIId, base_addr: usize, irq_num: u32) -> Self {
        Self {
            instance_id,
            base_addr,
            irq_num,
            trans_mode: MCITransMode::DMA,
            non_removable: false,
        }
    }

    /* Get the device instance default configure  */
    pub fn lookup_config(instance_id: MCIId) -> Self {
        match instance_id {
            MCIId::MCI0 => Self::new(instance_id, FSDIF0_BASE_ADDR, FSDIF0_IRQ_NUM),
            MCIId::MCI1 => Self::new(instance_id, FSDIF1_BASE_ADDR, FSDIF1_IRQ_NUM),
        }
    }

    pub fn base_addr(&self) -> usize {
        self.base_addr
    }

    /* Register window after remapping, e.g. by ioremap */
    pub fn base_addr_set(&mut self, base_addr: usize) {
        self.base_addr = base_addr;
    }

    pub fn irq_num(&self) -> u32 {
        self.irq_num
    }

    pub fn trans_mode(&self) -> MCITransMode {
        self.trans_mode
    }

    pub fn trans_mode_set(&mut self, mode: MCITransMode) {
        self.trans_mode = mode;
    }

    pub fn non_removable(&self) -> bool {
        self.non_removable
    }

    /* eMMC is soldered on board, TF card is removable */
    pub fn non_removable_set(&mut self, non_removable: bool) {
        self.non_removable = non_removable;
    }

    pub fn instance_id(&self) -> MCIId {
        self.instance_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_defaults_to_dma_and_removable() {
        let config = MCIConfig::lookup_config(MCIId::MCI1);
        assert_eq!(config.instance_id(), MCIId::MCI1);
        assert_eq!(config.base_addr(), FSDIF1_BASE_ADDR);
        assert_eq!(config.irq_num(), FSDIF1_IRQ_NUM);
        assert_eq!(config.trans_mode(), MCITransMode::DMA);
        assert!(!config.non_removable());
    }
}

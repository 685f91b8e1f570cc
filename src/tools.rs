/// Reverse the order of four 32-bit words, byte order inside each word is kept
pub fn reverse_word_sequence_u32x4(value: &[u32; 4]) -> [u32; 4] {
    [value[3], value[2], value[1], value[0]]
}

use rand::Rng;

/// Unbiased in-place shuffle: for every index `i` from 1 to the end, draw
/// `j` uniformly from `0..=i` and swap the two positions.
pub fn shuffle_tags<T, R: Rng + ?Sized>(tags: &mut [T], rng: &mut R) {
    for i in 1..tags.len() {
        let j = rng.gen_range(0..=i);
        tags.swap(i, j);
    }
}

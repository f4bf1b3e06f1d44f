use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-unique id for connections and players.
///
/// Seeded from the clock once, then incremented, so two sockets accepted in the same
/// instant still get distinct ids.
pub fn rand_id() -> u64 {
    static NEXT: OnceLock<AtomicU64> = OnceLock::new();
    NEXT.get_or_init(|| {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default();
        AtomicU64::new(seed)
    })
    .fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_ids_are_drawn_back_to_back_then_they_differ() {
        let a = rand_id();
        let b = rand_id();
        assert_ne!(a, b);
    }
}

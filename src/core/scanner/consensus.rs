use std::collections::{HashMap, VecDeque};

/// 单字段的滑动窗口投票
///
/// 容量固定，先进先出淘汰。出现次数最多的值胜出；
/// 次数相同时，最近一次出现更晚的值胜出。
pub struct ConsensusWindow {
    values: VecDeque<String>,
    capacity: usize,
}

impl ConsensusWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn best(&self) -> Option<&str> {
        // 值 -> (次数, 最近一次出现的位置)
        let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, value) in self.values.iter().enumerate() {
            let entry = tally.entry(value.as_str()).or_insert((0, idx));
            entry.0 += 1;
            entry.1 = idx;
        }

        tally
            .into_iter()
            .max_by_key(|(_, (count, last))| (*count, *last))
            .map(|(value, _)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window() {
        let window = ConsensusWindow::new(7);
        assert!(window.is_empty());
        assert_eq!(window.best(), None);
    }

    #[test]
    fn test_majority_wins_over_recent_flicker() {
        let mut window = ConsensusWindow::new(7);
        for v in ["Pikachu", "Pikachu", "Pikachv", "Pikachu"] {
            window.push(v);
        }
        window.push("Pikacbu");
        assert_eq!(window.best(), Some("Pikachu"));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = ConsensusWindow::new(3);
        for v in ["a", "a", "b", "b", "c"] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        // 窗口 = [b, b, c]
        assert_eq!(window.best(), Some("b"));
    }

    #[test]
    fn test_tie_most_recent_wins() {
        let mut window = ConsensusWindow::new(7);
        for v in ["12", "34", "34", "12"] {
            window.push(v);
        }
        assert_eq!(window.best(), Some("12"));

        window.push("34");
        assert_eq!(window.best(), Some("34"));
    }

    #[test]
    fn test_same_value_saturates_any_capacity() {
        for capacity in 1..=10 {
            let mut window = ConsensusWindow::new(capacity);
            window.push("noise");
            for _ in 0..capacity {
                window.push("Mew");
            }
            assert_eq!(window.best(), Some("Mew"), "capacity {capacity}");
            assert!(window.len() <= capacity);
        }
    }

    #[test]
    fn test_blank_values_ignored_and_clear() {
        let mut window = ConsensusWindow::new(3);
        window.push("  ");
        assert!(window.is_empty());
        window.push("x");
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 3);
    }
}

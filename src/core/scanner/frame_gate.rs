use std::time::Duration;

/// 帧节流：两次接受之间至少间隔 `min_gap`，与相机帧率无关
pub struct FrameGate {
    min_gap: Duration,
    last_accepted: Option<Duration>,
}

impl FrameGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_accepted: None,
        }
    }

    pub fn with_millis(min_gap_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_gap_ms))
    }

    pub fn should_accept(&mut self, timestamp: Duration) -> bool {
        let accept = match self.last_accepted {
            None => true,
            // 时间戳回退（流重启）时重新锚定
            Some(last) if timestamp < last => true,
            Some(last) => timestamp - last >= self.min_gap,
        };

        if accept {
            self.last_accepted = Some(timestamp);
        }
        accept
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

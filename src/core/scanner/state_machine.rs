use std::time::Duration;

/// 扫描会话阶段（驻留门控）
#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    /// 无锚点
    Idle,
    /// 卡片已对准，计时中，结果暂不输出
    Tracking { anchor: Duration },
    /// 驻留时间已满足
    Settled { anchor: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateAction {
    /// 继续识别，但不输出
    Hold,
    Emit,
    /// 对准丢失，锚点清除
    Lost,
}

impl ScanPhase {
    pub fn new() -> Self {
        ScanPhase::Idle
    }

    pub fn anchor(&self) -> Option<Duration> {
        match self {
            ScanPhase::Idle => None,
            ScanPhase::Tracking { anchor } | ScanPhase::Settled { anchor } => Some(*anchor),
        }
    }

    pub fn transition(&self, aligned: bool, now: Duration, dwell: Duration) -> (ScanPhase, GateAction) {
        if !aligned {
            let action = match self {
                ScanPhase::Idle => GateAction::Hold,
                _ => GateAction::Lost,
            };
            return (ScanPhase::Idle, action);
        }

        let anchor = match self {
            ScanPhase::Idle => now,
            ScanPhase::Tracking { anchor } | ScanPhase::Settled { anchor } => {
                // 时间戳回退视为重新开始计时
                if now < *anchor {
                    now
                } else {
                    *anchor
                }
            }
        };

        if now - anchor >= dwell {
            (ScanPhase::Settled { anchor }, GateAction::Emit)
        } else {
            (ScanPhase::Tracking { anchor }, GateAction::Hold)
        }
    }
}

impl Default for ScanPhase {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DwellGate {
    phase: ScanPhase,
    dwell: Duration,
}

impl DwellGate {
    pub fn new(dwell: Duration) -> Self {
        Self {
            phase: ScanPhase::Idle,
            dwell,
        }
    }

    pub fn observe(&mut self, aligned: bool, now: Duration) -> GateAction {
        let (next, action) = self.phase.transition(aligned, now, self.dwell);
        self.phase = next;
        action
    }

    /// 在流水线末尾检查：`now - anchor >= dwell`
    pub fn is_satisfied(&self, now: Duration) -> bool {
        match self.phase.anchor() {
            Some(anchor) => now >= anchor && now - anchor >= self.dwell,
            None => false,
        }
    }

    pub fn current_phase(&self) -> &ScanPhase {
        &self.phase
    }

    pub fn reset(&mut self) {
        self.phase = ScanPhase::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_idle_to_tracking() {
        let mut gate = DwellGate::new(ms(1000));
        assert!(matches!(gate.current_phase(), ScanPhase::Idle));

        let action = gate.observe(true, ms(100));
        assert_eq!(action, GateAction::Hold);
        assert_eq!(gate.current_phase(), &ScanPhase::Tracking { anchor: ms(100) });
    }

    #[test]
    fn test_anchor_kept_while_aligned() {
        let mut gate = DwellGate::new(ms(1000));
        gate.observe(true, ms(0));
        gate.observe(true, ms(400));
        assert_eq!(gate.current_phase().anchor(), Some(ms(0)));

        let action = gate.observe(true, ms(1000));
        assert_eq!(action, GateAction::Emit);
        assert_eq!(gate.current_phase(), &ScanPhase::Settled { anchor: ms(0) });
        assert!(gate.is_satisfied(ms(1000)));
    }

    #[test]
    fn test_drop_clears_anchor() {
        let mut gate = DwellGate::new(ms(1000));
        gate.observe(true, ms(0));
        gate.observe(true, ms(1200));

        let action = gate.observe(false, ms(1500));
        assert_eq!(action, GateAction::Lost);
        assert_eq!(gate.current_phase(), &ScanPhase::Idle);
        assert!(!gate.is_satisfied(ms(1500)));

        gate.observe(true, ms(1800));
        assert_eq!(gate.current_phase().anchor(), Some(ms(1800)));
        assert!(!gate.is_satisfied(ms(2400)));
    }

    #[test]
    fn test_idle_stays_idle_without_alignment() {
        let mut gate = DwellGate::new(ms(1000));
        for t in 0..10 {
            assert_eq!(gate.observe(false, ms(t * 300)), GateAction::Hold);
        }
        assert!(!gate.is_satisfied(ms(10_000)));
    }

    #[test]
    fn test_reset() {
        let mut gate = DwellGate::new(ms(500));
        gate.observe(true, ms(0));
        gate.observe(true, ms(600));
        gate.reset();
        assert_eq!(gate.current_phase(), &ScanPhase::Idle);
    }
}

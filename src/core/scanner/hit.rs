use serde::{Deserialize, Serialize};

/// 一次识别结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanHit {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl ScanHit {
    pub fn new(name: Option<String>, number: Option<String>) -> Self {
        Self { name, number }
    }

    pub fn has_content(&self) -> bool {
        non_empty(&self.name).is_some() || non_empty(&self.number).is_some()
    }

    /// 两个字段去首尾空白，空串视为缺失
    pub fn normalized(&self) -> ScanHit {
        ScanHit {
            name: non_empty(&self.name).map(str::to_string),
            number: non_empty(&self.number).map(str::to_string),
        }
    }

    /// 合并两次结果，右侧非空字段优先
    pub fn merge(&self, other: &ScanHit) -> ScanHit {
        ScanHit {
            name: non_empty(&other.name)
                .or_else(|| non_empty(&self.name))
                .map(str::to_string),
            number: non_empty(&other.number)
                .or_else(|| non_empty(&self.number))
                .map(str::to_string),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

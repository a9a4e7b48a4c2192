//! 识别文本后处理：卡名清洗、卡号提取
//!
//! 拉丁文模板词只按匹配区间删除，区间外的日文内容原样保留。
//! `(?-u:\b)` 是 ASCII 词边界，日文字符与拉丁词之间也算边界。

use once_cell::sync::Lazy;
use regex::Regex;

/// 卡名中的模板噪声（阶段/类型/HP 标记）
static NAME_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?-u:\b)evolves\s+from(?-u:\b).*$",
        r"(?i)(?-u:\b)stage\s*[12](?-u:\b)",
        r"(?i)(?-u:\b)basic(?-u:\b)",
        r"(?i)(?-u:\b)HP\s*[0-9]{2,3}(?-u:\b)",
        r"(?i)(?-u:\b)[0-9]{2,3}\s*HP(?-u:\b)",
        r"[12]\s*進化",
        r"(?:^|\s)たね(?:\s|$)",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

/// 日文进化说明的结尾，前面紧跟进化前的卡名
const EVOLVES_FROM_JA: &str = "から進化";

/// 整行都是进化说明的文本
static EVOLUTION_CAPTION: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?-u:\b)evolves\s+from(?-u:\b)|から進化"));

static FRACTION: Lazy<Regex> = Lazy::new(|| compile(r"([0-9]{1,4})\s*/\s*[0-9]{1,4}"));
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(?-u:\b)No\.?\s*([0-9]{1,4})"));
/// SWSH123 / SV-P 045 / S-P 012
static PROMO_CODE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?-u:\b)[A-Z]{1,4}(?:-?[A-Z])?\s?-?\s?([0-9]{1,4})(?-u:\b)")
});
static STANDALONE: Lazy<Regex> = Lazy::new(|| compile(r"(?-u:\b)([0-9]{1,3})(?-u:\b)"));

/// 只用于常量模式
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern}: {e}"))
}

/// 清洗卡名；结果为空白时返回 `None`
pub fn clean_name(raw: &str) -> Option<String> {
    let mut text = raw.to_string();
    for pattern in NAME_NOISE.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    collapse_whitespace(&strip_japanese_caption(&text))
}

/// 说明单独成词时整词删除；与卡名粘连时只删结尾标记，不动其余文字
fn strip_japanese_caption(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() <= 1 {
        return text.replace(EVOLVES_FROM_JA, " ");
    }
    tokens
        .into_iter()
        .filter(|token| !token.contains(EVOLVES_FROM_JA))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_template_noise(line: &str) -> bool {
    EVOLUTION_CAPTION.is_match(line) || clean_name(line).is_none()
}

/// 非空白字符中数字占一半以上
pub fn is_mostly_numeric(line: &str) -> bool {
    let mut digits = 0usize;
    let mut total = 0usize;
    for c in fold_full_width(line).chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if c.is_ascii_digit() {
            digits += 1;
        }
    }
    total > 0 && digits * 2 > total
}

/// 按优先级提取卡号：分数形式 > No. > 宣传卡编号 > 首个 1-3 位数字
pub fn extract_number(raw: &str) -> Option<String> {
    let text = fold_full_width(raw);

    let digits = [&*FRACTION, &*NUMBER_PREFIX, &*PROMO_CODE, &*STANDALONE]
        .into_iter()
        .find_map(|re| {
            re.captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })?;

    Some(strip_leading_zeros(&digits))
}

pub fn strip_leading_zeros(digits: &str) -> String {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// 是否含有日文（平假名、片假名、汉字、半角片假名）
pub fn contains_secondary_script(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{FF66}'..='\u{FF9F}')
    })
}

/// 全角 ASCII（０-９、／、Ｎｏ．等）转半角
fn fold_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

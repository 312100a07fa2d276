//! 字段格式化器
//!
//! 每个聚合定义携带一个 `FieldFormat`，按内容类型生成格式化函数

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{ContentType, FormatterOptions};

/// 格式化函数：`(value, options) -> String`
pub type Formatter = Arc<dyn Fn(&Value, &FormatterOptions) -> String + Send + Sync>;

/// 字段格式定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "id", rename_all = "snake_case")]
pub enum FieldFormat {
    #[default]
    Default,
    Number {
        decimals: usize,
        decimal_separator: char,
        group_separator: Option<char>,
    },
    Currency {
        prefix: String,
        decimals: usize,
        decimal_separator: char,
        group_separator: Option<char>,
    },
    Percent {
        decimals: usize,
        decimal_separator: char,
    },
    Url,
}

/// 构造指定格式和内容类型的格式化函数
pub fn field_formatter(format: &FieldFormat, content_type: ContentType) -> Formatter {
    let format = format.clone();
    match (format, content_type) {
        (FieldFormat::Url, ContentType::Html) => Arc::new(|value: &Value, options: &FormatterOptions| {
            let text = value_to_text(value);
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                html_escape(&resolve_url(&text, options)),
                html_escape(&text)
            )
        }),
        (format, ContentType::Text) => {
            Arc::new(move |value: &Value, _: &FormatterOptions| format_text(&format, value))
        }
        (format, ContentType::Html) => {
            Arc::new(move |value: &Value, _: &FormatterOptions| {
                html_escape(&format_text(&format, value))
            })
        }
    }
}

fn format_text(format: &FieldFormat, value: &Value) -> String {
    let number = match format {
        FieldFormat::Default | FieldFormat::Url => None,
        _ => value_as_f64(value),
    };
    let Some(n) = number else {
        return value_to_text(value);
    };

    match format {
        FieldFormat::Number {
            decimals,
            decimal_separator,
            group_separator,
        } => format_number(n, *decimals, *decimal_separator, *group_separator),
        FieldFormat::Currency {
            prefix,
            decimals,
            decimal_separator,
            group_separator,
        } => format!(
            "{}{}",
            prefix,
            format_number(n, *decimals, *decimal_separator, *group_separator)
        ),
        FieldFormat::Percent {
            decimals,
            decimal_separator,
        } => format!(
            "{}%",
            format_number(n * 100.0, *decimals, *decimal_separator, None)
        ),
        FieldFormat::Default | FieldFormat::Url => value_to_text(value),
    }
}

/// 原始值的默认文本形式
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 按固定小数位格式化数字，整数部分可选分组
pub fn format_number(
    n: f64,
    decimals: usize,
    decimal_separator: char,
    group_separator: Option<char>,
) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + 4);
    if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }

    match group_separator {
        Some(sep) => {
            let len = integer.len();
            for (i, c) in integer.chars().enumerate() {
                if i > 0 && (len - i) % 3 == 0 {
                    out.push(sep);
                }
                out.push(c);
            }
        }
        None => out.push_str(integer),
    }

    if let Some(fraction) = fraction {
        out.push(decimal_separator);
        out.push_str(fraction);
    }
    out
}

fn resolve_url(url: &str, options: &FormatterOptions) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!(
            "{}{}{}",
            options.parsed_url.origin, options.parsed_url.base_path, url
        )
    } else {
        url.to_string()
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

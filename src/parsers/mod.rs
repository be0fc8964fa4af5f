//! # 日志解析器模块
//!
//! GRRM 日志分块与字段提取的公共原语：
//! - 行分类器：按重复标记串前缀识别 OPT/IRC/FREQ/LUP 分隔行
//! - 子块提取器：定位一种作业类型的首个有界片段
//! - 块切分状态机：顶层作业序列和 LUP 子作业组共用同一实现
//! - 带标签校验的定位字段提取（标签不符立即报 Format 错误）
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: opt, freq, irc, lup, afir, log, com

pub mod afir;
pub mod com;
pub mod freq;
pub mod irc;
pub mod log;
pub mod lup;
pub mod opt;

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{GrrmKitError, Result};
use crate::models::JobKind;

/// OPT 作业分隔行前缀
pub const OPT_MARKER: &str = "OPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPTOPT";
/// IRC 作业分隔行前缀
pub const IRC_MARKER: &str = "IRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRCIRC";
/// FREQ 作业分隔行前缀
pub const FREQ_MARKER: &str = "FREQFREQFREQFREQFREQFREQFREQFREQFREQFREQFREQFREQFREQFREQ";
/// LUP 作业分隔行前缀
pub const LUP_MARKER: &str = "LUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUPLUP";

impl JobKind {
    /// 该作业类型的分隔行前缀
    pub fn marker(&self) -> &'static str {
        match self {
            JobKind::Opt => OPT_MARKER,
            JobKind::Irc => IRC_MARKER,
            JobKind::Freq => FREQ_MARKER,
            JobKind::Lup => LUP_MARKER,
        }
    }
}

/// 行分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Marker(JobKind),
    Data,
}

/// 单行分类：分隔行或普通数据行（纯函数）
pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with(OPT_MARKER) {
        LineKind::Marker(JobKind::Opt)
    } else if line.starts_with(IRC_MARKER) {
        LineKind::Marker(JobKind::Irc)
    } else if line.starts_with(FREQ_MARKER) {
        LineKind::Marker(JobKind::Freq)
    } else if line.starts_with(LUP_MARKER) {
        LineKind::Marker(JobKind::Lup)
    } else {
        LineKind::Data
    }
}

/// 提取目标作业类型的首个子块
///
/// 扫描目标类型分隔行的第一次和第二次出现：
/// - 无出现: `None`
/// - 仅一次 (开启未闭合): opt/irc 返回开启处到输入末尾（运行中作业有效）；
///   freq 返回 `None`（频率块只在收敛闭合后才有意义）
/// - 两次出现: 返回闭合片段 [first, second]，两条分隔行都包含
pub fn extract_sub_block<S: AsRef<str>>(lines: &[S], kind: JobKind) -> Option<&[S]> {
    let marker = kind.marker();
    let mut start = None;
    let mut end = None;

    for (i, line) in lines.iter().enumerate() {
        if line.as_ref().starts_with(marker) {
            if start.is_none() {
                start = Some(i);
            } else {
                end = Some(i + 1);
                break;
            }
        }
    }

    let start = start?;
    match end {
        Some(end) => Some(&lines[start..end]),
        None => match kind {
            JobKind::Freq => None,
            _ => Some(&lines[start..]),
        },
    }
}

/// 块切分结果：一个完整（或尾部未闭合）的作业块
#[derive(Debug, Clone)]
pub struct RawJobBlock {
    pub kind: JobKind,
    /// 开启分隔行在输入中的下标
    pub start: usize,
    /// 块结束位置（闭合分隔行之后，或输入末尾）
    pub end: usize,
    pub lines: Vec<String>,
}

/// 作业块切分状态机
///
/// 顶层序列器和 LUP 子作业组扫描共用。规则：
/// - 无挂起类型时数据行忽略（作业前导文本）
/// - 首个分隔行设定挂起类型；同类型分隔行再次出现时闭合该块
/// - 不同类型的分隔行按内容累积（属于嵌套块，由块解析器自行下探）
/// - 输入结束时未闭合的尾块仍然产出（最后一个可能未完成的作业）
pub fn split_job_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<RawJobBlock> {
    let mut blocks = Vec::new();
    let mut pending: Option<(JobKind, usize)> = None;
    let mut buffer: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match classify_line(line) {
            LineKind::Data => {
                if pending.is_some() {
                    buffer.push(line.to_string());
                }
            }
            LineKind::Marker(kind) => match pending {
                None => {
                    pending = Some((kind, i));
                    buffer.clear();
                    buffer.push(line.to_string());
                }
                Some((current, start)) if current == kind => {
                    buffer.push(line.to_string());
                    blocks.push(RawJobBlock {
                        kind: current,
                        start,
                        end: i + 1,
                        lines: std::mem::take(&mut buffer),
                    });
                    pending = None;
                }
                Some(_) => {
                    buffer.push(line.to_string());
                }
            },
        }
    }

    if let Some((kind, start)) = pending {
        if !buffer.is_empty() {
            blocks.push(RawJobBlock {
                kind,
                start,
                end: lines.len(),
                lines: buffer,
            });
        }
    }

    blocks
}

// ─────────────────────────────────────────────────────────────
// 定位字段提取辅助
// ─────────────────────────────────────────────────────────────

/// 解析十进制数值（支持科学计数法回退），失败时报告所在行
pub(crate) fn parse_decimal(token: &str, line: &str) -> Result<Decimal> {
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .map_err(|_| GrrmKitError::format("numeric value", line.trim()))
}

/// 取 `idx` 行，越界视为记录被截断
pub(crate) fn line_at<'a, S: AsRef<str>>(lines: &'a [S], idx: usize, what: &str) -> Result<&'a str> {
    lines
        .get(idx)
        .map(|l| l.as_ref())
        .ok_or_else(|| GrrmKitError::format(what, "<unexpected end of block>"))
}

/// 校验 `idx` 行含有全部期望标签（大小写不敏感），然后取第 `token` 个
/// 空白分隔字段解析为十进制数
pub(crate) fn labeled_token<S: AsRef<str>>(
    lines: &[S],
    idx: usize,
    labels: &[&str],
    token: usize,
) -> Result<Decimal> {
    let line = line_at(lines, idx, labels[0])?;
    let upper = line.to_uppercase();
    for label in labels {
        if !upper.contains(&label.to_uppercase()) {
            return Err(GrrmKitError::format(
                format!("{} line", labels.join(" ")),
                line.trim(),
            ));
        }
    }
    let value = line
        .split_whitespace()
        .nth(token)
        .ok_or_else(|| GrrmKitError::format(format!("{} line", labels.join(" ")), line.trim()))?;
    parse_decimal(value, line)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SLError {
    /// 待比较的值与表内已有的值之间无法排序
    #[error("Incomparable type, {0}")]
    IncomparableType(&'static str),
    #[error("The probability parameter must be greater than 0, got {0}")]
    ProbabilityTooLow(f64),
    #[error("The probability parameter must be less than 1, got {0}")]
    ProbabilityTooHigh(f64),
}

impl SLError {
    /// 构造参数不合法（概率过低或过高）
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, SLError::ProbabilityTooLow(_) | SLError::ProbabilityTooHigh(_))
    }

    pub fn is_incomparable(&self) -> bool {
        matches!(self, SLError::IncomparableType(_))
    }
}

pub(crate) const ERROR_TYPE_SEARCH: &str = "cannot search with incomparable types";
pub(crate) const ERROR_TYPE_INSERT: &str =
    "when inserting, the type must be comparable with whatever is already in the list";

pub type SLResult<T> = Result<T, SLError>;

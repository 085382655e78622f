use rand::{rngs::StdRng, SeedableRng};

use crate::ds::error::{SLError, SLResult};

/// 默认的晋升概率
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// 跳表构造参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkiplistConfig {
    /// 新节点晋升到上一层的概率，取值必须在 (0, 1) 之间。
    /// 期望层高约为 log_{1/p}(n)
    pub probability: f64,
    /// 随机数种子。为空时从系统熵源初始化
    pub seed: Option<u64>,
}

impl Default for SkiplistConfig {
    fn default() -> Self {
        Self { probability: DEFAULT_PROBABILITY, seed: None }
    }
}

impl SkiplistConfig {
    pub fn new(probability: f64) -> Self {
        Self { probability, seed: None }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 检查概率参数。NaN 按过低处理
    pub fn validate(&self) -> SLResult<()> {
        let p = self.probability;
        if p.is_nan() || p <= 0.0 {
            log::warn!("rejecting skiplist probability {}: too low", p);
            return Err(SLError::ProbabilityTooLow(p));
        }
        if p >= 1.0 {
            log::warn!("rejecting skiplist probability {}: too high", p);
            return Err(SLError::ProbabilityTooHigh(p));
        }
        Ok(())
    }

    /// 两个配置合并：概率取平均，种子优先取左边的
    pub(crate) fn averaged(&self, other: &Self) -> Self {
        Self {
            probability: (self.probability + other.probability) / 2.0,
            seed: self.seed.or(other.seed),
        }
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

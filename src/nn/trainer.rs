/*
 * @Description  : 全批量训练循环（可恢复的状态对象）
 *
 * 每调用一次 advance() 就推进到下一个汇报点：
 *   训练集前向 + 评估 -> 反向传播 -> 参数更新 -> 验证集前向 + 评估
 * 每逢 report_interval 的整数倍轮次（含第0轮）追加历史、保存检查点并返回快照；
 * 停止条件满足时记录总轮数、保存最终检查点并返回带 finished 标记的快照。
 * 两次 advance() 之间不做任何计算，调用方停止拉取即停止训练。
 */

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::history::{HistoryRecord, ProgressSnapshot, TrainingHistory};
use super::metrics::{Metrics, evaluate};
use super::{ParamStorage, ParameterStore, Parameters, backward, forward, optimizer};
use crate::config::NetConfig;
use crate::data::{DataError, Dataset, LabeledSet};
use crate::errors::ModelError;

/// 停止策略，二选一
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoppingPolicy {
    /// 最近一轮的训练准确率严格低于目标时继续；此模式下忽略轮数
    AccuracyTarget(f32),
    /// 已完成轮数低于上限时继续
    EpochLimit(u32),
}

impl StoppingPolicy {
    /// 按给出的可选参数选择模式：给了目标准确率即为准确率模式，
    /// 否则为轮数模式；两者都没给时报错
    pub fn from_options(
        target_accuracy: Option<f32>,
        epochs: Option<u32>,
    ) -> Result<Self, ModelError> {
        match (target_accuracy, epochs) {
            (Some(target), _) if target.is_nan() => Err(ModelError::InvalidTrainingConfiguration(
                "目标准确率不能为 NaN".to_string(),
            )),
            (Some(target), _) => Ok(Self::AccuracyTarget(target)),
            (None, Some(epochs)) => Ok(Self::EpochLimit(epochs)),
            (None, None) => Err(ModelError::InvalidTrainingConfiguration(
                "须指定目标准确率或训练轮数上限".to_string(),
            )),
        }
    }

    /// 是否再跑一轮
    ///
    /// 准确率模式用的是上一轮参数更新前算出的训练准确率；
    /// 还一轮都没跑时没有准确率可比，总会跑第0轮。
    pub fn should_continue(&self, epoch: u32, last_train_accuracy: Option<f32>) -> bool {
        match *self {
            Self::AccuracyTarget(target) => last_train_accuracy.is_none_or(|acc| acc < target),
            Self::EpochLimit(limit) => epoch < limit,
        }
    }
}

/// 参数的来源
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInit<H> {
    /// 随机初始化；给定种子时可复现
    Fresh { seed: Option<u64> },
    /// 从存储中恢复；失败即报错，不会退回随机初始化
    Restore(H),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// 一次 advance() 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub snapshot: ProgressSnapshot,
    /// 为 true 时训练已结束，之后不能再 advance()
    pub finished: bool,
}

/// 训练循环
pub struct TrainingLoop<S: ParamStorage> {
    config: NetConfig,
    dataset: Dataset,
    store: ParameterStore,
    policy: StoppingPolicy,
    storage: S,
    history: TrainingHistory,
    /// 已完成的轮数
    epoch: u32,
    last_train: Option<Metrics>,
    last_val: Option<Metrics>,
    last_checkpoint: Option<S::Handle>,
    /// 最近一次检查点保存时已完成的轮数
    checkpoint_epoch: Option<u32>,
    state: LoopState,
    started: Option<Instant>,
}

impl<S: ParamStorage> TrainingLoop<S> {
    /// 校验配置与数据、准备参数；任何计算开始前失败
    pub fn new(
        config: NetConfig,
        dataset: Dataset,
        init: ParamInit<S::Handle>,
        policy: StoppingPolicy,
        storage: S,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        check_set(&dataset.train, &config)?;
        check_set(&dataset.test, &config)?;
        if let StoppingPolicy::AccuracyTarget(target) = policy {
            if target > 1.0 {
                log::warn!("目标准确率{target}大于1，训练将不会自行停止");
            }
        }

        let store = match init {
            ParamInit::Fresh { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                ParameterStore::new_random(&config, &mut rng)
            }
            ParamInit::Restore(handle) => {
                let params = storage.load(&handle)?;
                log::info!("已从 {handle:?} 恢复参数");
                ParameterStore::from_params(&config, params)?
            }
        };

        let total_epochs = match policy {
            StoppingPolicy::EpochLimit(limit) => Some(limit),
            StoppingPolicy::AccuracyTarget(_) => None,
        };

        Ok(Self {
            config,
            dataset,
            store,
            policy,
            storage,
            history: TrainingHistory::new(total_epochs),
            epoch: 0,
            last_train: None,
            last_val: None,
            last_checkpoint: None,
            checkpoint_epoch: None,
            state: LoopState::Running,
            started: None,
        })
    }

    /// 推进到下一个汇报点或训练结束
    ///
    /// 检查点保存失败时返回该错误，且循环随即进入结束状态：
    /// 此后再调用只会得到`TrainingTerminated`，不会在缺少检查点的情况下继续训练。
    pub fn advance(&mut self) -> Result<Progress, ModelError> {
        if self.state == LoopState::Terminated {
            return Err(ModelError::TrainingTerminated);
        }
        let started = *self.started.get_or_insert_with(Instant::now);

        while self.should_continue() {
            let (train, val) = self.run_epoch();
            let epoch = self.epoch;
            self.epoch += 1;

            if epoch % self.config.report_interval == 0 {
                self.history.append(HistoryRecord::new(epoch, train, val));
                self.checkpoint()?;
                // 若此刻已满足停止条件，本次汇报与最终快照合并为同一个
                if self.should_continue() {
                    return Ok(Progress {
                        snapshot: self.history.last_snapshot(),
                        finished: false,
                    });
                }
            }
        }

        self.finish(started)
    }

    fn should_continue(&self) -> bool {
        self.policy
            .should_continue(self.epoch, self.last_train.map(|m| m.accuracy))
    }

    /// 一轮完整的全批量训练 + 验证
    fn run_epoch(&mut self) -> (Metrics, Metrics) {
        let train_set = &self.dataset.train;
        let cache = forward(self.store.params(), train_set.features());
        let train = evaluate(&cache.a2, train_set.labels());
        let grads = backward(
            train_set.features(),
            train_set.labels(),
            &self.store.params().w2,
            &cache,
        );
        optimizer::step(self.store.params_mut(), &grads, self.config.learning_rate);

        // 验证只做监控，不影响参数
        let test_set = &self.dataset.test;
        let val_cache = forward(self.store.params(), test_set.features());
        let val = evaluate(&val_cache.a2, test_set.labels());

        if !train.loss.is_finite() {
            log::warn!("第{}轮训练损失为{}", self.epoch, train.loss);
        }
        self.last_train = Some(train);
        self.last_val = Some(val);
        (train, val)
    }

    fn checkpoint(&mut self) -> Result<(), ModelError> {
        let handle = self.storage.save(self.store.params()).inspect_err(|e| {
            log::error!("第{}轮检查点保存失败，训练终止：{e}", self.epoch);
            self.state = LoopState::Terminated;
        })?;
        log::debug!("第{}轮检查点已保存：{handle:?}", self.epoch);
        self.last_checkpoint = Some(handle);
        self.checkpoint_epoch = Some(self.epoch);
        Ok(())
    }

    fn finish(&mut self, started: Instant) -> Result<Progress, ModelError> {
        self.history.set_total_epochs(self.epoch);
        if self.checkpoint_epoch != Some(self.epoch) {
            self.checkpoint()?;
        }
        log::info!(
            "训练完成：共 {} 轮，耗时 {:.2} 秒",
            self.epoch,
            started.elapsed().as_secs_f64()
        );
        self.state = LoopState::Terminated;
        Ok(Progress {
            snapshot: self.history.last_snapshot(),
            finished: true,
        })
    }

    /// 把训练跑完，返回最终快照
    pub fn run_to_end(&mut self) -> Result<ProgressSnapshot, ModelError> {
        loop {
            let progress = self.advance()?;
            if progress.finished {
                return Ok(progress.snapshot);
            }
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == LoopState::Terminated
    }

    /// 已完成的轮数
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn policy(&self) -> StoppingPolicy {
        self.policy
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// 当前参数（只在两轮之间可见，不会看到更新到一半的状态）
    pub fn params(&self) -> &Parameters {
        self.store.params()
    }

    /// 当前参数的独立拷贝
    pub fn snapshot(&self) -> Parameters {
        self.store.snapshot()
    }

    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// 最近一轮的训练集指标（参数更新前）
    pub fn last_train_metrics(&self) -> Option<Metrics> {
        self.last_train
    }

    /// 最近一轮的验证集指标（参数更新后）
    pub fn last_val_metrics(&self) -> Option<Metrics> {
        self.last_val
    }

    pub fn last_checkpoint(&self) -> Option<&S::Handle> {
        self.last_checkpoint.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 拆出历史与存储，供绘图或后续推理使用
    pub fn into_parts(self) -> (TrainingHistory, S) {
        (self.history, self.storage)
    }
}

impl<S: ParamStorage> Iterator for TrainingLoop<S> {
    type Item = Result<ProgressSnapshot, ModelError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        Some(self.advance().map(|progress| progress.snapshot))
    }
}

fn check_set(set: &LabeledSet, config: &NetConfig) -> Result<(), ModelError> {
    let rows = set.features().nrows();
    if rows != config.input_size {
        return Err(DataError::ShapeMismatch {
            expected: vec![config.input_size, set.len()],
            got: vec![rows, set.len()],
        }
        .into());
    }
    if let Some((index, &label)) = set
        .labels()
        .iter()
        .enumerate()
        .find(|(_, l)| **l >= config.num_classes)
    {
        return Err(DataError::LabelOutOfRange {
            index,
            label,
            num_classes: config.num_classes,
        }
        .into());
    }
    Ok(())
}

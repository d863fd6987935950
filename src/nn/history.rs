/*
 * @Description  : 训练历史记录与进度快照
 *
 * 历史是只追加的有序记录，每个汇报间隔一条；"总轮数"是单独的标量，
 * 训练中途为轮数上限（若有），训练结束时设为实际完成的轮数。
 * 越界查询返回全零记录而非报错，仅用于监控展示。
 */

use std::fmt;

use super::metrics::Metrics;

/// 某个汇报轮次的指标
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistoryRecord {
    pub epoch: u32,
    pub train_accuracy: f32,
    pub train_loss: f32,
    pub val_accuracy: f32,
    pub val_loss: f32,
}

impl HistoryRecord {
    pub fn new(epoch: u32, train: Metrics, val: Metrics) -> Self {
        Self {
            epoch,
            train_accuracy: train.accuracy,
            train_loss: train.loss,
            val_accuracy: val.accuracy,
            val_loss: val.loss,
        }
    }
}

/// 供绘图使用的并行序列
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySeries {
    pub epochs: Vec<u32>,
    pub train_accuracy: Vec<f32>,
    pub train_loss: Vec<f32>,
    pub val_accuracy: Vec<f32>,
    pub val_loss: Vec<f32>,
}

/// 交给调用方的进度快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub epoch: u32,
    /// 总轮数，始终不小于`epoch`
    pub total: u32,
    pub train_accuracy: f32,
    pub train_loss: f32,
    pub val_accuracy: f32,
    pub val_loss: f32,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Iteration: {} / {}", self.epoch, self.total)?;
        writeln!(
            f,
            "Training Accuracy: {:.3}%\tTraining Loss: {:.3}",
            self.train_accuracy * 100.0,
            self.train_loss
        )?;
        writeln!(
            f,
            "Validation Accuracy: {:.3}%\tValidation Loss: {:.3}",
            self.val_accuracy * 100.0,
            self.val_loss
        )
    }
}

/// 训练历史
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingHistory {
    total_epochs: Option<u32>,
    records: Vec<HistoryRecord>,
}

impl TrainingHistory {
    /// `total_epochs`为`None`时，快照里的总轮数取记录自身的轮次
    pub fn new(total_epochs: Option<u32>) -> Self {
        Self {
            total_epochs,
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
        log::info!("{}", self.snapshot_of(&record));
    }

    pub fn set_total_epochs(&mut self, total_epochs: u32) {
        self.total_epochs = Some(total_epochs);
    }

    pub fn total_epochs(&self) -> Option<u32> {
        self.total_epochs
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 第`index`条记录；越界时返回全零记录
    pub fn record(&self, index: usize) -> HistoryRecord {
        self.records.get(index).copied().unwrap_or_default()
    }

    /// 最后一条记录；尚无记录时返回全零记录
    pub fn last_record(&self) -> HistoryRecord {
        self.records.last().copied().unwrap_or_default()
    }

    /// 把一条记录渲染为进度快照，总轮数取 max(epoch, total)
    pub fn snapshot_of(&self, record: &HistoryRecord) -> ProgressSnapshot {
        let total = self.total_epochs.unwrap_or(record.epoch);
        ProgressSnapshot {
            epoch: record.epoch,
            total: record.epoch.max(total),
            train_accuracy: record.train_accuracy,
            train_loss: record.train_loss,
            val_accuracy: record.val_accuracy,
            val_loss: record.val_loss,
        }
    }

    /// 最后一条记录对应的快照
    pub fn last_snapshot(&self) -> ProgressSnapshot {
        self.snapshot_of(&self.last_record())
    }

    pub fn series(&self) -> HistorySeries {
        let mut series = HistorySeries::default();
        for r in &self.records {
            series.epochs.push(r.epoch);
            series.train_accuracy.push(r.train_accuracy);
            series.train_loss.push(r.train_loss);
            series.val_accuracy.push(r.val_accuracy);
            series.val_loss.push(r.val_loss);
        }
        series
    }
}

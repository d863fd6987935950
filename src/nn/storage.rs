/*
 * @Description  : 参数持久化
 *
 * 训练循环只通过 ParamStorage 与外部存储打交道：
 * - save：整组写入，返回一个可用于加载的句柄
 * - load：按句柄整组读出；内容缺损或形状不符报 CorruptOrIncompatibleState
 *
 * 区分两种失败：句柄指向的文件根本不存在或无法读取时是`ModelError::Io`
 * （检查点缺失），读到了但解码失败才是`CorruptOrIncompatibleState`。
 * MemoryStorage 没有 IO，未知序号一律视为`CorruptOrIncompatibleState`。
 */

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::Parameters;
use crate::config::NetConfig;
use crate::errors::ModelError;

/// 参数持久化的协作接口
pub trait ParamStorage {
    type Handle: Clone + Debug;

    /// 整组保存参数
    fn save(&mut self, params: &Parameters) -> Result<Self::Handle, ModelError>;

    /// 按句柄整组加载参数，与保存时逐位相同
    fn load(&self, handle: &Self::Handle) -> Result<Parameters, ModelError>;
}

/// 单文件存储：每次保存覆盖同一路径
///
/// 先写入同目录下的临时文件再重命名，读方不会看到写了一半的文件。
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 使用配置中的检查点路径
    pub fn from_config(config: &NetConfig) -> Self {
        Self::new(&config.checkpoint_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "params".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ParamStorage for FileStorage {
    type Handle = PathBuf;

    fn save(&mut self, params: &Parameters) -> Result<PathBuf, ModelError> {
        let bytes = params.to_bytes()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &self.path)?;
        log::debug!("参数已保存到 {:?}（{} 字节）", self.path, bytes.len());
        Ok(self.path.clone())
    }

    /// 文件不存在时返回`ModelError::Io`
    fn load(&self, handle: &PathBuf) -> Result<Parameters, ModelError> {
        let bytes = fs::read(handle)?;
        Parameters::from_bytes(&bytes)
    }
}

/// 内存存储：每次保存追加一个二进制块，句柄为其序号
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Vec<Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接放入一个二进制块（可用于导入外部数据）
    pub fn insert_blob(&mut self, blob: Vec<u8>) -> usize {
        self.blobs.push(blob);
        self.blobs.len() - 1
    }

    pub fn blob(&self, handle: usize) -> Option<&[u8]> {
        self.blobs.get(handle).map(Vec::as_slice)
    }

    /// 已保存的块数
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ParamStorage for MemoryStorage {
    type Handle = usize;

    fn save(&mut self, params: &Parameters) -> Result<usize, ModelError> {
        let bytes = params.to_bytes()?;
        Ok(self.insert_blob(bytes))
    }

    fn load(&self, handle: &usize) -> Result<Parameters, ModelError> {
        let blob = self.blob(*handle).ok_or_else(|| {
            ModelError::CorruptOrIncompatibleState(format!("不存在序号为 {handle} 的参数块"))
        })?;
        Parameters::from_bytes(blob)
    }
}

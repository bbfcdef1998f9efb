//! App - アプリケーション層
//!
//! ports を組み合わせてワーカーの実行ロジックを実装します。
//!
//! # 主要コンポーネント
//! - **WorkerConfig**: task type ごとの設定（handler, concurrency, polling interval）
//! - **WorkerPool**: ループの起動・shutdown・完了待ち
//! - **WorkerLoop**: タスク実行ループ（poll→execute→report）
//! - **TaskExecutor**: handler の実行と結果の正規化

pub mod config;
pub mod executor;
pub mod pool;
pub mod worker_loop;

pub use self::config::{DEFAULT_POLLING_INTERVAL, WorkerConfig, WorkerConfigBuilder};
pub use self::executor::TaskExecutor;
pub use self::pool::WorkerPool;
pub use self::worker_loop::{Iteration, WorkerLoop};

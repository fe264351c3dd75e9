#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod handler;
pub mod service;

pub use error::{Result, WorkerError};
pub use handler::AvatarWorker;
pub use service::{AvatarProcessor, WorkerConfig, WorkerState};

//! The crate exposes the collaborator interfaces the sequencer consumes, along with their
//! error types. Concrete implementations live with the collaborators; the sequencer only
//! ever sees these traits.

mod block;
pub use block::{L2BlockSource, SourceError};

mod builder;
pub use builder::{BlockBuilder, BlockBuilderFactory, BuilderError};

mod globals;
pub use globals::GlobalVariablesBuilder;

mod message;
pub use message::L1ToL2MessageSource;

mod pool;
pub use pool::{PoolError, PoolStatus, TxPool};

mod processor;
pub use processor::{
    ProcessorError, ProcessorLimits, PublicProcessor, PublicProcessorFactory, TxValidationPolicy,
};

mod publisher;
pub use publisher::{L1Publisher, PublisherError};

mod slasher;
pub use slasher::{SlashPayloadProvider, Slasher};

mod time;
pub use time::{DateProvider, SystemDateProvider};

mod validator;
pub use validator::{BlockBuilderFn, ValidatorClient, ValidatorClientError};

mod world_state;
pub use world_state::{StateFork, WorldState, WorldStateError, WorldStateStatus};

#[cfg(any(test, feature = "test-utils"))]
/// Mock implementations of every provider trait, shared by the sequencer tests.
pub mod test_utils;

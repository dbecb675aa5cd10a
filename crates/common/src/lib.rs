// notula-common: shared types and wire payloads for the Notula workspace

pub mod note;
pub mod protocol;
pub mod task;

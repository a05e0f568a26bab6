//! Audio domain module

mod artifact;
mod mime;

pub use artifact::AudioArtifact;
pub use mime::{
    default_preferred_types, negotiate, parse_type_list, MimeType, DEFAULT_PREFERRED_TYPES,
};

//! applite: boot-config seeding and boot-readiness detection for virtual
//! network appliances.
//!
//! The library covers the two hard pieces of appliance provisioning:
//!
//! - **Seeding**: turn a disk image's persona ([`ComponentKind`]), instance
//!   identity, and optional user overrides into the boot-configuration
//!   documents consumed by the guest at first boot
//!   ([`Provisioner::provision`]).
//! - **Readiness**: decide when the instance has finished booting by
//!   polling its serial console on a fixed cadence, tolerating silent and
//!   slow boots, and forcing a restart when the console goes quiet for too
//!   long ([`BootMonitor::tick`]).
//!
//! Process supervision, QEMU argument construction, the console transport
//! itself, and media tooling stay behind the [`console::Console`],
//! [`instance::InstanceControl`], and [`media::MediaBuilder`] seams.

pub mod backup;
pub mod config;
pub mod console;
pub mod constants;
pub mod errors;
pub mod instance;
pub mod media;
pub mod options;
pub mod profile;
pub mod provision;
pub mod readiness;
pub mod template;

pub use config::{SeedDocuments, Synthesizer, merge_values};
pub use errors::{AppliteError, AppliteResult};
pub use options::ProvisionOptions;
pub use profile::{ClassifiedImage, ComponentKind, ComponentProfile, classify};
pub use provision::{Provisioner, ProvisionedInstance};
pub use readiness::{BootMonitor, PostBootAction, ReadinessState, Tick};

pub mod entities;
pub mod messaging;
pub mod ports;
pub mod recurrence;
pub mod reminder_window;
pub mod repositories;

pub use entities::*;
pub use messaging::*;
pub use petcare_errors::{PetcareError, PetcareResult};
pub use ports::*;
pub use repositories::*;

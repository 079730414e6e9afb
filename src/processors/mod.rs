pub mod integrity_checker;

pub use integrity_checker::{DateGap, IntegrityChecker, IntegrityReport, Violation, ViolationType};

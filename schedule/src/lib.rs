//! Installment scheduling.
//!
//! A principal is split into N installments: `principal div N` each, with the
//! remainder added to installment 1, so the plan always sums to the principal.
//! Due dates are `origin + (i - 1) × period / N`: the first is due at the
//! origin and the schedule depends only on `(origin, period, N)`.
//!
//! An unpaid installment past its due date becomes `Late` and carries a fee,
//! computed once. Pending installments inside the reminder window are
//! reminder-eligible; de-duplicating reminders is the notifier's job.

pub mod error;
pub mod late;
pub mod plan;
pub mod reminder;
pub mod split;

pub use error::ScheduleError;
pub use late::{consecutive_late, LateFeePolicy};
pub use plan::{build_plan, Installment, InstallmentStatus, PaymentTerms, MAX_INSTALLMENTS};
pub use reminder::{is_reminder_due, Reminder};
pub use split::split_principal;

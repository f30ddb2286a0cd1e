pub mod asset;
pub mod disposal;
pub mod faculty;
pub mod issue;
pub mod pending_update;
pub mod rejected;
pub mod returns;
pub mod stock;
pub mod user;

pub use asset::{Asset, CreatePurchase, PurchaseItem};
pub use disposal::{CreateDisposal, DisposalRequest, DisposalSource};
pub use faculty::{CourseHandled, Faculty, FacultyInput, FacultyType, Publication};
pub use issue::{CreateIssue, IssuedRecord, TempIssue};
pub use pending_update::PendingUpdate;
pub use rejected::{RejectedAsset, RejectionSource};
pub use returns::{CreateReturn, ReturnCondition, ReturnRequest, ServiceRecord, ServiceStatus};
pub use stock::StockEntry;
pub use user::{PublicUser, RegisterUser, User};

pub mod attachment;
pub mod report;
pub mod user;

pub use attachment::{Entity as Attachment, Model as AttachmentModel};
pub use report::{Entity as Report, Model as ReportModel};
pub use user::{Entity as User, Model as UserModel};

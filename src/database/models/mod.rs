pub mod catalog;
pub mod message;
pub mod schedule;
pub mod section;
pub mod user;

pub use catalog::{Course, Department, Semester};
pub use message::{MessagePriority, MessageType, MessageView};
pub use schedule::{MeetingView, ScheduleItem};
pub use section::{SectionBasic, SectionView};
pub use user::{UserRow, UserSummary};

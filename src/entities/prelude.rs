pub use super::audio_files::Entity as AudioFiles;
pub use super::file_tags::Entity as FileTags;
pub use super::file_versions::Entity as FileVersions;
pub use super::pack_files::Entity as PackFiles;
pub use super::packs::Entity as Packs;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;

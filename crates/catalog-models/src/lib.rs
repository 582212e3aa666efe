pub mod backup;
pub mod media;
pub mod wishlist;

pub use backup::{BackupResult, BackupType};
pub use media::MediaItem;
pub use wishlist::{new_entry_id, NewWishlistEntry, WishlistEntry, WishlistPatch};

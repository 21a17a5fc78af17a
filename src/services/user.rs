//! Profile reads and icon uploads.

use std::sync::Arc;

use tracing::info;

use crate::cache::{icon_fingerprint, ProfileAssemblyCache};
use crate::error::Result;
use crate::models::UserProfile;
use crate::source::{ProfileSource, UserStore};

/// Outcome of an icon fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconFetch {
    /// The client's `If-None-Match` already names the stored icon
    NotModified,
    /// Stored bytes, or the fallback image when none were uploaded
    Image {
        bytes: Vec<u8>,
        icon_hash: Option<String>,
    },
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    profiles: Arc<ProfileAssemblyCache>,
    fallback_icon: Arc<[u8]>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        profiles: Arc<ProfileAssemblyCache>,
        fallback_icon: Arc<[u8]>,
    ) -> Self {
        Self {
            users,
            profiles,
            fallback_icon,
        }
    }

    /// Profile of `user_id`, served from the profile cache.
    pub fn profile(&self, user_id: i64) -> Result<UserProfile> {
        self.profiles.get_profile(user_id)
    }

    /// Profile looked up by username. The name lookup itself is not cached.
    pub fn profile_by_name(&self, name: &str) -> Result<UserProfile> {
        let row = self.users.find_user_by_name(name)?;
        self.profiles.get_profile(row.id)
    }

    // == Icon ==
    /// Icon of `username`.
    ///
    /// `if_none_match` is compared against the quoted stored hash. Users who
    /// never uploaded an icon have no hash and always get the fallback bytes.
    pub fn icon(&self, username: &str, if_none_match: Option<&str>) -> Result<IconFetch> {
        let user = self.users.find_user_by_name(username)?;
        if let (Some(hash), Some(tag)) = (&user.icon_hash, if_none_match) {
            if tag == format!("\"{}\"", hash) {
                return Ok(IconFetch::NotModified);
            }
        }

        let bytes = match self.users.fetch_icon_bytes(user.id)? {
            Some(bytes) => bytes,
            None => self.fallback_icon.to_vec(),
        };
        Ok(IconFetch::Image {
            bytes,
            icon_hash: user.icon_hash,
        })
    }

    // == Upload Icon ==
    /// Stores the image and its fingerprint. Cached profiles keep the old
    /// fingerprint until their TTL runs out.
    pub fn upload_icon(&self, user_id: i64, image: Vec<u8>) -> Result<i64> {
        let icon_hash = icon_fingerprint(&image);
        let icon_id = self.users.store_icon(user_id, image, icon_hash)?;
        info!("Stored icon {} for user {}", icon_id, user_id);
        Ok(icon_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::error::AppError;
    use crate::source::{MemoryDatabase, NewUser};
    use std::time::Duration;

    fn setup() -> (UserService, Arc<ManualClock>, i64) {
        let db = Arc::new(MemoryDatabase::new());
        let clock = Arc::new(ManualClock::new());
        let profiles = Arc::new(ProfileAssemblyCache::new(
            db.clone(),
            clock.clone(),
            b"fallback",
            Duration::from_millis(1300),
        ));
        let id = db
            .insert_user(NewUser {
                name: "user7".to_string(),
                display_name: String::new(),
                description: String::new(),
                hashed_password: "hash".to_string(),
                dark_mode: false,
            })
            .unwrap()
            .id;
        (UserService::new(db, profiles, Arc::from(&b"fallback"[..])), clock, id)
    }

    #[test]
    fn test_profile_by_name() {
        let (service, _, id) = setup();

        assert_eq!(service.profile_by_name("user7").unwrap().id, id);
        assert!(matches!(
            service.profile_by_name("ghost"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_icon_upload_visible_only_after_ttl() {
        let (service, clock, id) = setup();
        let before = service.profile(id).unwrap().icon_hash;
        assert_eq!(before, icon_fingerprint(b"fallback"));

        clock.advance(Duration::from_millis(500));
        service.upload_icon(id, b"jpeg bytes".to_vec()).unwrap();

        clock.advance(Duration::from_millis(100));
        assert_eq!(service.profile(id).unwrap().icon_hash, before);

        clock.advance(Duration::from_millis(900));
        assert_eq!(
            service.profile(id).unwrap().icon_hash,
            icon_fingerprint(b"jpeg bytes")
        );
    }

    #[test]
    fn test_icon_falls_back_without_upload() {
        let (service, _, _) = setup();

        let fetched = service.icon("user7", Some("\"anything\"")).unwrap();
        assert_eq!(
            fetched,
            IconFetch::Image {
                bytes: b"fallback".to_vec(),
                icon_hash: None,
            }
        );
    }

    #[test]
    fn test_icon_not_modified_for_matching_tag() {
        let (service, _, id) = setup();
        service.upload_icon(id, b"jpeg bytes".to_vec()).unwrap();
        let hash = icon_fingerprint(b"jpeg bytes");

        let tag = format!("\"{}\"", hash);
        assert_eq!(service.icon("user7", Some(&tag)).unwrap(), IconFetch::NotModified);

        // Unquoted or stale tags get the bytes
        for tag in [hash.as_str(), "\"old\""] {
            assert!(matches!(
                service.icon("user7", Some(tag)).unwrap(),
                IconFetch::Image { bytes, .. } if bytes == b"jpeg bytes"
            ));
        }
        assert!(matches!(
            service.icon("user7", None).unwrap(),
            IconFetch::Image { icon_hash: Some(h), .. } if h == hash
        ));
    }

    #[test]
    fn test_icon_unknown_user() {
        let (service, _, _) = setup();
        assert!(matches!(service.icon("ghost", None), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_upload_icon_unknown_user() {
        let (service, _, _) = setup();
        assert!(matches!(
            service.upload_icon(99, vec![1]),
            Err(AppError::NotFound(_))
        ));
    }
}

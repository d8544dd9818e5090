//! Key encoding utilities for `RocksDB`.

use promptpix_core::UserId;

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an email index key.
#[must_use]
pub fn email_key(email: &str) -> Vec<u8> {
    email.as_bytes().to_vec()
}

/// Decode a user ID stored as an email index value.
#[must_use]
pub fn user_id_from_index(value: &[u8]) -> Option<UserId> {
    let bytes: [u8; 16] = value.try_into().ok()?;
    Some(UserId::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_length() {
        let key = account_key(&UserId::generate());
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn index_value_decodes_to_user_id() {
        let user_id = UserId::generate();
        assert_eq!(user_id_from_index(&account_key(&user_id)), Some(user_id));
        assert_eq!(user_id_from_index(b"short"), None);
    }
}

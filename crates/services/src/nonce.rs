use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Short-lived request nonces bound to a user and an action. A nonce is valid
/// during the half-lifetime tick it was created in and the one after.
pub struct NonceService {
    secret: String,
    tick_secs: i64,
}

impl NonceService {
    pub fn new(secret: String, lifetime_secs: u64) -> Self {
        Self {
            secret,
            tick_secs: (lifetime_secs as i64 / 2).max(1),
        }
    }

    pub fn create(&self, user: &str, action: &str) -> String {
        self.create_at(user, action, Utc::now().timestamp())
    }

    pub fn verify(&self, nonce: &str, user: &str, action: &str) -> bool {
        self.verify_at(nonce, user, action, Utc::now().timestamp())
    }

    fn create_at(&self, user: &str, action: &str, now: i64) -> String {
        self.mac(self.tick(now), user, action)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    fn verify_at(&self, nonce: &str, user: &str, action: &str, now: i64) -> bool {
        let Ok(given) = hex::decode(nonce) else {
            return false;
        };
        let tick = self.tick(now);
        [tick, tick - 1]
            .into_iter()
            .any(|t| {
                self.mac(t, user, action)
                    .is_some_and(|mac| mac.verify_slice(&given).is_ok())
            })
    }

    fn tick(&self, now: i64) -> i64 {
        now.div_euclid(self.tick_secs)
    }

    fn mac(&self, tick: i64, user: &str, action: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(format!("{}|{}|{}", tick, user, action).as_bytes());
        Some(mac)
    }
}

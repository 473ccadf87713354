// Request signing for the provider's account/date/secure scheme.

use chrono::NaiveDate;

use crate::datetime;

/// Account credentials issued by the provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    account: String,
    password: String,
}

/// The authentication attributes stamped onto an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub date: String,
    pub account: String,
    pub secure: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            password: password.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Sign a request for the given date.
    ///
    /// The secure token is the lowercase hex MD5 digest of
    /// `<date>&<password>`, with the date rendered in the provider's plain
    /// date format.
    pub fn sign(&self, date: NaiveDate) -> Signature {
        let date = date.format(datetime::DATE).to_string();
        let secure = format!("{:x}", md5::compute(format!("{}&{}", date, self.password)));
        Signature {
            date,
            account: self.account.clone(),
            secure,
        }
    }
}

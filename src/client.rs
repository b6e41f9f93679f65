use serde::Deserialize;

/// Ordered from least to most trusted, so levels compare with `<`/`>`.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeLevel {
    #[default]
    Initial,
    Intermediate,
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    pub surname: String,
    pub address: Option<String>,
    pub passport: Option<String>,
    pub privilege_level: PrivilegeLevel,
}

impl Client {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_passport(mut self, passport: impl Into<String>) -> Self {
        self.passport = Some(passport.into());
        self
    }

    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_level = level;
        self
    }

    /// Full needs a passport, Intermediate and above need an address.
    pub fn meets_requirements(&self) -> bool {
        let passport_ok = self.privilege_level < PrivilegeLevel::Full || self.passport.is_some();
        let address_ok =
            self.privilege_level < PrivilegeLevel::Intermediate || self.address.is_some();
        passport_ok && address_ok
    }

    /// Returns the record this client would become after upgrading to
    /// `upgrade.privilege_level`, or `None` if that is not an upgrade.
    ///
    /// Fields are taken cumulatively: a Full upgrade brings both passport and
    /// address, an Intermediate one only the address.
    pub fn upgraded(&self, upgrade: &Client) -> Option<Client> {
        if upgrade.privilege_level <= self.privilege_level {
            return None;
        }
        let mut merged = self.clone();
        if upgrade.privilege_level >= PrivilegeLevel::Full {
            merged.passport = upgrade.passport.clone();
        }
        if upgrade.privilege_level >= PrivilegeLevel::Intermediate {
            merged.address = upgrade.address.clone();
        }
        merged.privilege_level = upgrade.privilege_level;
        Some(merged)
    }
}

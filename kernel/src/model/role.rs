use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Manager,
    Worker,
}

impl Role {
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Manager)
    }
}

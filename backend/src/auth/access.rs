//! Role-to-route access table.
//!
//! Every role-scoped route prefix and the roles allowed under it are listed
//! here and nowhere else. The route guard and the session resolver both read
//! from this table, so enforcement and dashboard selection cannot drift.

use super::models::Role;

/// Root under which every route requires an authenticated session.
pub const PROTECTED_ROOT: &str = "/uit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub prefix: &'static str,
    pub allowed: Vec<Role>,
}

/// What a path demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    /// Outside the protected root; no credential needed.
    Public,
    /// Under the protected root but not role-scoped.
    Authenticated,
    /// Role-scoped prefix.
    Roles(&'a AccessRule),
}

impl Requirement<'_> {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Requirement::Public | Requirement::Authenticated => true,
            Requirement::Roles(rule) => rule.allowed.contains(&role),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessTable {
    rules: Vec<AccessRule>,
}

impl AccessTable {
    /// Admin, student and lecturer prefixes.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                rule("/uit/admin", Role::Admin),
                rule("/uit/student", Role::Student),
                rule("/uit/lecturer", Role::Lecturer),
            ],
        }
    }

    /// Standard prefixes plus advisor, department-officer and class-leader.
    pub fn extended() -> Self {
        let mut table = Self::standard();
        table.rules.extend([
            rule("/uit/advisor", Role::Advisor),
            rule("/uit/department-officer", Role::DepartmentOfficer),
            rule("/uit/class-leader", Role::ClassLeader),
        ]);
        table
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn requirement_for(&self, path: &str) -> Requirement<'_> {
        if !segment_prefix(path, PROTECTED_ROOT) {
            return Requirement::Public;
        }
        self.rules
            .iter()
            .find(|rule| segment_prefix(path, rule.prefix))
            .map(Requirement::Roles)
            .unwrap_or(Requirement::Authenticated)
    }

    /// Dashboard route for `role`, if the table scopes a prefix to it.
    pub fn dashboard_for(&self, role: Role) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.allowed.contains(&role))
            .map(|rule| rule.prefix)
    }
}

impl Default for AccessTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn rule(prefix: &'static str, role: Role) -> AccessRule {
    AccessRule {
        prefix,
        allowed: vec![role],
    }
}

/// `prefix` matches `path` only on a whole-segment boundary.
fn segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

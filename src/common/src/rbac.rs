use lazy_static::lazy_static;
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    All,
    ManageAccounts,
    ViewAccounts,
    ManageCompanies,
    ViewCompanies,
    ManageEvents,
    ViewEvents,
    ManageAttendance,
    ViewAttendance,
    CheckIn,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin = 1,
    Staff = 2,
    Member = 3,
}

lazy_static! {
    pub static ref PERMISSIONS: Vec<(Role, Vec<Permission>)> = vec![
        (Role::Admin, vec![Permission::All]),
        (Role::Staff, vec![
            Permission::ViewAccounts,
            Permission::ViewCompanies,
            Permission::ManageEvents,
            Permission::ViewEvents,
            Permission::ViewAttendance,
            Permission::CheckIn,
        ]),
        (Role::Member, vec![]),
    ];
}

/// Permissions granted to `role`, `All` expanded.
pub fn role_permissions(role: Role) -> Vec<Permission> {
    for (r, perms) in PERMISSIONS.iter() {
        if *r != role {
            continue;
        }
        if perms.contains(&Permission::All) {
            return vec![
                Permission::All,
                Permission::ManageAccounts,
                Permission::ViewAccounts,
                Permission::ManageCompanies,
                Permission::ViewCompanies,
                Permission::ManageEvents,
                Permission::ViewEvents,
                Permission::ManageAttendance,
                Permission::ViewAttendance,
                Permission::CheckIn,
            ];
        }
        return perms.clone();
    }

    vec![]
}

use std::sync::Arc;

use metadata::MetadataProvider;

use crate::accounts::Accounts;
use crate::auth;
use crate::auth::Auth;
use crate::companies::Companies;
use crate::events::Events;
use crate::notifications::Notifier;
use crate::registrations::Registrations;

pub struct PlatformProvider {
    pub accounts: Arc<Accounts>,
    pub auth: Arc<Auth>,
    pub companies: Arc<Companies>,
    pub events: Arc<Events>,
    pub registrations: Arc<Registrations>,
}

impl PlatformProvider {
    pub fn new(md: Arc<MetadataProvider>, notifier: Arc<dyn Notifier>, cfg: auth::Config) -> Self {
        Self {
            accounts: Arc::new(Accounts::new(md.accounts.clone(), md.companies.clone())),
            auth: Arc::new(Auth::new(md.accounts.clone(), md.companies.clone(), cfg)),
            companies: Arc::new(Companies::new(md.companies.clone())),
            events: Arc::new(Events::new(md.events.clone())),
            registrations: Arc::new(Registrations::new(md, notifier)),
        }
    }
}

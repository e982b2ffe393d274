use crate::config::AppConfig;
use crate::form::FormStaging;
use crate::infra::ids::generator_for;
use crate::store::TicketStore;

/// Everything one editing session owns.
pub struct AppContext {
    pub config: AppConfig,
    pub store: TicketStore,
    pub form: FormStaging,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let store = TicketStore::new(
            config.status_scheme,
            config.rating_policy,
            generator_for(config.id_strategy),
        );
        let form = FormStaging::new(
            config.status_scheme.default_status(),
            config.default_priority(),
        );
        Self {
            config,
            store,
            form,
        }
    }
}

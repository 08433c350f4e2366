use serenity::model::gateway::GatewayIntents;

use crate::prelude::*;

pub mod checkin;
pub mod report;

mod prelude {
    pub use serenity::http::Http;
    pub use serenity::prelude::*;

    pub use super::Module as _;
    pub use crate::config::HBotConfig;
    pub use crate::prelude::*;
}

/// Run an expression against every module.
///
/// Syntax is:
///
/// ```ignore
/// for_each_module!(|m| do_stuff(m));
/// ```
macro_rules! for_each_module {
    (@inner $module:expr, |$var:ident| $body:expr) => {{
        let $var = $module;
        $body
    }};
    (|$var:ident| $body:expr) => {{
        $crate::modules::for_each_module!(@inner $crate::modules::checkin::Module, |$var| $body);
        $crate::modules::for_each_module!(@inner $crate::modules::report::Module, |$var| $body);
    }};
}

pub(crate) use for_each_module;

pub trait Module: Sized {
    /// The intents needed.
    fn intents(&self, config: &config::HBotConfig) -> GatewayIntents {
        _ = config;
        GatewayIntents::empty()
    }

    /// Validates that the config is good.
    fn validate(&self, config: &config::HBotConfig) -> Result {
        _ = config;
        Ok(())
    }

    /// Prepares the database for this module.
    ///
    /// This will generally create indices on related collections.
    async fn db_init(self, db: &mongodb::Database) -> Result {
        _ = db;
        Ok(())
    }
}

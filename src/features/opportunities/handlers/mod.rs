pub mod opportunity_handler;

pub use opportunity_handler::{
    __path_create_opportunity, __path_delete_opportunity, __path_get_opportunity,
    __path_list_opportunities, __path_list_responsible_names, create_opportunity,
    delete_opportunity, get_opportunity, list_opportunities, list_responsible_names,
};

//! Declarative triggers
//!
//! Wires every widget's document-level listeners in one call. Each widget
//! also exposes its own `install_data_api` for pages that only use a few.

use crate::widgets::{alert, button, carousel, collapse, dropdown, modal, offcanvas, popover, tab, toast, tooltip};
use crate::Runtime;

/// Install the data API of every widget
pub fn install_all(rt: &mut Runtime) {
    alert::install_data_api(rt);
    button::install_data_api(rt);
    carousel::install_data_api(rt);
    collapse::install_data_api(rt);
    dropdown::install_data_api(rt);
    modal::install_data_api(rt);
    offcanvas::install_data_api(rt);
    popover::install_data_api(rt);
    tab::install_data_api(rt);
    toast::install_data_api(rt);
    tooltip::install_data_api(rt);
    tracing::debug!("data api installed, {} document listeners", rt.events().count(fos_dom::NodeId::ROOT));
}

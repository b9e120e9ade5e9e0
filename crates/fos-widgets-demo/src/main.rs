//! fOS Widgets - Scripted walkthrough
//!
//! Builds a small page, installs the data API and drives it with synthetic
//! clicks and keys while the clock is advanced by hand. Run with
//! `RUST_LOG=fos_widgets=debug` to watch the lifecycle.

use anyhow::{Context, Result};
use fos_widgets::dom::NodeId;
use fos_widgets::widgets::{Carousel, Collapse, Dropdown, Modal, Toast};
use fos_widgets::{data_api, Component, Config, Runtime, Showable, StaticPlacement};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r##"
<nav>
  <button id="menu-toggle" data-bs-toggle="dropdown">Menu</button>
  <ul class="dropdown-menu">
    <li><a class="dropdown-item" href="#">Open</a></li>
    <li><a class="dropdown-item" href="#">Save</a></li>
  </ul>
</nav>
<button id="details-toggle" data-bs-toggle="collapse" data-bs-target="#details">Details</button>
<div id="details" class="collapse">Hidden until asked for</div>
<button id="modal-open" data-bs-toggle="modal" data-bs-target="#confirm">Delete</button>
<div id="confirm" class="modal fade" tabindex="-1">
  <div class="modal-dialog"><button data-bs-dismiss="modal">Cancel</button></div>
</div>
<div id="slides" class="carousel slide" data-bs-interval="2000">
  <div class="carousel-item active">One</div>
  <div class="carousel-item">Two</div>
  <div class="carousel-item">Three</div>
</div>
<div id="saved" class="toast fade" data-bs-delay="1500">Saved</div>
"##;

fn by_id(rt: &Runtime, id: &str) -> Result<NodeId> {
    rt.document
        .get_element_by_id(id)
        .with_context(|| format!("page has no #{id}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rt = Runtime::new();
    rt.set_placement_engine(StaticPlacement::new());
    let body = rt.document.body();
    for node in rt.document.parse_fragment(PAGE) {
        rt.document.append_child(body, node);
    }
    // transitions on the page take 300ms
    for id in ["details", "confirm", "slides", "saved"] {
        let element = by_id(&rt, id)?;
        rt.document.set_computed(element, "transition-duration", "0.3s");
    }
    data_api::install_all(&mut rt);
    rt.install_plugin_bridge();
    rt.load();

    // dropdown
    let toggle = by_id(&rt, "menu-toggle")?;
    rt.click(toggle);
    let dropdown = Dropdown::get_instance(&rt, toggle).context("dropdown not created")?;
    tracing::info!("dropdown open: {}", dropdown.is_shown());
    rt.key_down(toggle, "ArrowDown", false);
    tracing::info!("focused item: {:?}", rt.document.active_element());
    rt.key_down(toggle, "Escape", false);
    tracing::info!("dropdown open after Escape: {}", dropdown.is_shown());

    // collapse
    let details = by_id(&rt, "details")?;
    rt.click(by_id(&rt, "details-toggle")?);
    let collapse = Collapse::get_instance(&rt, details).context("collapse not created")?;
    tracing::info!("collapse state: {:?}", collapse.state());
    rt.advance(310);
    tracing::info!("collapse state: {:?}", collapse.state());

    // modal
    let confirm = by_id(&rt, "confirm")?;
    rt.click(by_id(&rt, "modal-open")?);
    rt.advance(310);
    let modal = Modal::get_instance(&rt, confirm).context("modal not created")?;
    tracing::info!(
        "modal shown: {}, body classes: {:?}",
        modal.is_shown(),
        rt.document.get_attribute(body, "class")
    );
    rt.key_down(confirm, "Escape", false);
    rt.advance(310);
    tracing::info!("modal shown after Escape: {}", modal.is_shown());

    // carousel
    let slides = by_id(&rt, "slides")?;
    let carousel = Carousel::get_or_create_instance(&mut rt, slides, Config::new())?;
    carousel.cycle(&mut rt);
    for _ in 0..3 {
        rt.advance(2310);
        tracing::info!("carousel on slide {:?}", carousel.active_index(&rt));
    }
    carousel.pause(&mut rt);

    // toast
    let saved = by_id(&rt, "saved")?;
    let toast = Toast::get_or_create_instance(&mut rt, saved, Config::new())?;
    toast.show(&mut rt);
    rt.advance(310);
    tracing::info!("toast shown: {}", toast.is_shown());
    rt.advance(1500 + 310);
    tracing::info!("toast shown after delay: {}", toast.is_shown());

    rt.plugin("modal", &[confirm], fos_widgets::PluginCall::Method("dispose"))?;
    tracing::info!("done at t={}ms", rt.now());
    Ok(())
}

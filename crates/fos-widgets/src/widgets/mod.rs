//! Widgets
//!
//! One module per component. Each exposes its handle type, the command
//! enum the plugin bridge parses method names into, and an
//! `install_data_api` that wires the document-level declarative triggers.

pub mod alert;
pub mod button;
pub mod carousel;
pub mod collapse;
pub mod dropdown;
pub mod modal;
pub mod offcanvas;
pub mod popover;
pub mod tab;
pub mod toast;
pub mod tooltip;

pub use alert::{Alert, AlertCommand};
pub use button::{Button, ButtonCommand};
pub use carousel::{Carousel, CarouselCommand, Direction, Order};
pub use collapse::{Collapse, CollapseCommand, Dimension};
pub use dropdown::{clear_menus, AutoClose, Dropdown, DropdownCommand};
pub use modal::{BackdropMode, Modal, ModalCommand};
pub use offcanvas::{Offcanvas, OffcanvasCommand};
pub use popover::{Popover, PopoverCommand};
pub use tab::{Tab, TabCommand};
pub use toast::{Toast, ToastCommand};
pub use tooltip::{Tooltip, TooltipCommand, Trigger};

//! Well-known descriptor keys.
//!
//! Enhancers should use these keys where one fits, so that consumers can
//! read descriptions without knowing which enhancer produced them. Any other
//! string is accepted as a free-form key.

/// Alias of the resource type, e.g. `app.page`.
pub const TYPE_ALIAS: &str = "type.alias";

/// Humanized resource type, e.g. `Page`.
pub const TYPE_TITLE: &str = "type.title";

/// Title of the payload itself, e.g. `My Blog Post`.
pub const PAYLOAD_TITLE: &str = "title";

/// URI of the HTML edit form.
pub const LINK_EDIT_HTML: &str = "link.edit.html";
/// URI of the HTML create form.
pub const LINK_CREATE_HTML: &str = "link.create.html";
/// URI of the HTML update endpoint.
pub const LINK_UPDATE_HTML: &str = "link.update.html";
/// URI of the HTML remove endpoint.
pub const LINK_REMOVE_HTML: &str = "link.remove.html";
/// URI of the HTML show page.
pub const LINK_SHOW_HTML: &str = "link.show.html";
/// URI of the HTML list page.
pub const LINK_LIST_HTML: &str = "link.list.html";

/// Map of child type to the HTML URI creating such a child.
pub const LINKS_CREATE_CHILD_HTML: &str = "links.create_child.html";

/// URI of the REST edit endpoint.
pub const LINK_EDIT_REST: &str = "link.edit.rest";
/// URI of the REST create endpoint.
pub const LINK_CREATE_REST: &str = "link.create.rest";
/// URI of the REST update endpoint.
pub const LINK_UPDATE_REST: &str = "link.update.rest";
/// URI of the REST remove endpoint.
pub const LINK_REMOVE_REST: &str = "link.remove.rest";
/// URI of the REST show endpoint.
pub const LINK_SHOW_REST: &str = "link.show.rest";
/// URI of the REST list endpoint.
pub const LINK_LIST_REST: &str = "link.list.rest";

/// Concrete payload types permitted as children. A list of strings.
pub const CHILDREN_TYPES: &str = "children.types";

/// Whether children may be added at all. A boolean.
pub const CHILDREN_ALLOW: &str = "children.allow";

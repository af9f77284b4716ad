//! Depth-first traversal of every addressable node of a document.
//!
//! The walk order is fixed: `info`, `components`, `paths`, `servers`,
//! `security`, `externalDocs`, `tags`. Named maps are visited in key order,
//! lists in index order. Empty maps and lists are skipped without visiting
//! the container.
//!
//! The visitor returns `Ok(true)` to descend into a node, `Ok(false)` to
//! skip the node's children (siblings are still visited), or an error,
//! which stops the walk and is returned unchanged.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde_json::Value;

use crate::model::*;
use crate::path::{is_prefix_match, StructuralPath};

macro_rules! nodes {
    ($($(#[$meta:meta])* $variant:ident($ty:ty),)*) => {
        /// The kind of a node, without the borrow.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            /// The document root; only ever seen as a parent.
            Document,
            $($(#[$meta])* $variant,)*
        }

        impl NodeKind {
            pub fn name(&self) -> &'static str {
                match self {
                    NodeKind::Document => "Document",
                    $(NodeKind::$variant => stringify!($variant),)*
                }
            }
        }

        /// A mutable borrow of one node of a document.
        #[derive(Debug)]
        pub enum Node<'a> {
            $($(#[$meta])* $variant(&'a mut $ty),)*
        }

        impl Node<'_> {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $(Node::$variant(_) => NodeKind::$variant,)*
                }
            }

            /// Serialize the node to a generic value.
            pub fn to_value(&self) -> Result<Value, serde_json::Error> {
                match self {
                    $(Node::$variant(node) => serde_json::to_value(&**node),)*
                }
            }

            /// Replace the node wholesale with `value` decoded as the
            /// node's type. On error the node is left unchanged.
            pub fn replace_with(self, value: Value) -> Result<(), serde_json::Error> {
                match self {
                    $(Node::$variant(node) => *node = serde_json::from_value(value)?,)*
                }
                Ok(())
            }
        }
    };
}

nodes! {
    Info(Info),
    Components(Components),
    Paths(BTreeMap<String, PathItem>),
    PathItem(PathItem),
    Operation(Operation),
    Servers(Vec<Server>),
    Server(Server),
    ServerVariables(BTreeMap<String, ServerVariable>),
    ServerVariable(ServerVariable),
    SecurityRequirements(Vec<SecurityRequirement>),
    SecurityRequirement(SecurityRequirement),
    ExternalDocs(ExternalDocs),
    Tags(Vec<Tag>),
    Tag(Tag),
    /// The schema registry or a schema's `properties`.
    Schemas(BTreeMap<String, SchemaRef>),
    /// `allOf`, `anyOf` or `oneOf` of a schema.
    SchemaList(Vec<SchemaRef>),
    Schema(SchemaRef),
    Discriminator(Discriminator),
    DiscriminatorMapping(BTreeMap<String, String>),
    MappingTarget(String),
    /// Every field of a schema that the model does not name, at the
    /// `extensions` segment. This holds `x-` extensions and also JSON Schema
    /// keywords outside OpenAPI 3.0 such as `const` or `$schema`.
    Extensions(Extensions),
    /// One unmodelled schema field, keyed by its name.
    Extension(Value),
    ParameterMap(BTreeMap<String, ParameterRef>),
    Parameters(Vec<ParameterRef>),
    Parameter(ParameterRef),
    Headers(BTreeMap<String, HeaderRef>),
    Header(HeaderRef),
    Responses(BTreeMap<String, ResponseRef>),
    Response(ResponseRef),
    RequestBodies(BTreeMap<String, RequestBodyRef>),
    RequestBody(RequestBodyRef),
    Content(BTreeMap<String, MediaType>),
    MediaType(MediaType),
    Encodings(BTreeMap<String, Encoding>),
    Encoding(Encoding),
    Links(BTreeMap<String, LinkRef>),
    Link(LinkRef),
    LinkParameters(BTreeMap<String, Value>),
    LinkParameter(Value),
    Examples(BTreeMap<String, ExampleRef>),
    Example(ExampleRef),
    Callbacks(BTreeMap<String, CallbackRef>),
    Callback(CallbackRef),
    SecuritySchemes(BTreeMap<String, SecuritySchemeRef>),
    SecurityScheme(SecuritySchemeRef),
    OAuthFlows(OAuthFlows),
    OAuthFlow(OAuthFlow),
}

/// Walk options.
#[derive(Debug, Clone, Default)]
pub struct Walker {
    follow_refs: bool,
    visit_prefixes: Vec<Vec<String>>,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into nodes that carry a `$ref`.
    ///
    /// Off by default: a referencing node is visited but its (possibly
    /// resolved) value is not.
    pub fn follow_refs(mut self, follow: bool) -> Self {
        self.follow_refs = follow;
        self
    }

    /// Only invoke the visitor for paths starting with `prefix`.
    ///
    /// May be given several times; a path matching any prefix is visited.
    pub fn visit_prefix<I>(mut self, prefix: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.visit_prefixes
            .push(prefix.into_iter().map(Into::into).collect());
        self
    }

    /// Walk `doc`, calling `visitor` with each node's path, its parent's
    /// kind and the node itself.
    pub fn walk<E, F>(&self, doc: &mut Document, visitor: F) -> Result<(), E>
    where
        F: FnMut(&StructuralPath, NodeKind, Node<'_>) -> Result<bool, E>,
    {
        Walk {
            options: self,
            visitor,
            error: PhantomData,
        }
        .document(doc)
    }
}

struct Walk<'w, F, E> {
    options: &'w Walker,
    visitor: F,
    error: PhantomData<fn() -> E>,
}

impl<F, E> Walk<'_, F, E>
where
    F: FnMut(&StructuralPath, NodeKind, Node<'_>) -> Result<bool, E>,
{
    fn in_scope(&self, path: &StructuralPath) -> bool {
        let prefixes = &self.options.visit_prefixes;
        prefixes.is_empty() || prefixes.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Whether anything at or below `path` can be in scope.
    fn reachable(&self, path: &StructuralPath) -> bool {
        let prefixes = &self.options.visit_prefixes;
        prefixes.is_empty()
            || prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix) || is_prefix_match(prefix, path.segments()))
    }

    fn descend_into<T>(&self, node: &Ref<T>) -> bool {
        self.options.follow_refs || !node.is_reference()
    }

    /// Returns whether to descend below the node.
    fn visit(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        node: Node<'_>,
    ) -> Result<bool, E> {
        if !self.in_scope(path) {
            return Ok(true);
        }
        (self.visitor)(path, parent, node)
    }

    fn leaf(&mut self, path: &StructuralPath, parent: NodeKind, node: Node<'_>) -> Result<(), E> {
        self.visit(path, parent, node).map(|_| ())
    }

    fn map<T, C, V>(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        map: &mut BTreeMap<String, T>,
        container: C,
        mut entry: V,
    ) -> Result<(), E>
    where
        C: FnOnce(&mut BTreeMap<String, T>) -> Node<'_>,
        V: FnMut(&mut Self, &StructuralPath, NodeKind, &mut T) -> Result<(), E>,
    {
        if map.is_empty() || !self.reachable(path) {
            return Ok(());
        }
        let node = container(&mut *map);
        let kind = node.kind();
        if !self.visit(path, parent, node)? {
            return Ok(());
        }
        for (key, value) in map.iter_mut() {
            entry(self, &path.child(key.as_str()), kind, value)?;
        }
        Ok(())
    }

    fn list<T, C, V>(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        list: &mut Vec<T>,
        container: C,
        mut entry: V,
    ) -> Result<(), E>
    where
        C: FnOnce(&mut Vec<T>) -> Node<'_>,
        V: FnMut(&mut Self, &StructuralPath, NodeKind, &mut T) -> Result<(), E>,
    {
        if list.is_empty() || !self.reachable(path) {
            return Ok(());
        }
        let node = container(&mut *list);
        let kind = node.kind();
        if !self.visit(path, parent, node)? {
            return Ok(());
        }
        for (i, value) in list.iter_mut().enumerate() {
            entry(self, &path.index(i), kind, value)?;
        }
        Ok(())
    }

    fn document(&mut self, doc: &mut Document) -> Result<(), E> {
        let root = StructuralPath::root();
        let parent = NodeKind::Document;

        self.leaf(&root.child("info"), parent, Node::Info(&mut doc.info))?;
        self.components(&root.child("components"), parent, &mut doc.components)?;
        self.map(
            &root.child("paths"),
            parent,
            &mut doc.paths,
            |m| Node::Paths(m),
            Self::path_item,
        )?;
        self.servers(&root.child("servers"), parent, &mut doc.servers)?;
        self.security(&root.child("security"), parent, &mut doc.security)?;
        if let Some(docs) = doc.external_docs.as_mut() {
            self.leaf(&root.child("externalDocs"), parent, Node::ExternalDocs(docs))?;
        }
        self.list(
            &root.child("tags"),
            parent,
            &mut doc.tags,
            |l| Node::Tags(l),
            Self::tag,
        )
    }

    fn components(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        components: &mut Components,
    ) -> Result<(), E> {
        if components.is_empty() || !self.reachable(path) {
            return Ok(());
        }
        if !self.visit(path, parent, Node::Components(&mut *components))? {
            return Ok(());
        }
        let kind = NodeKind::Components;
        self.map(
            &path.child("schemas"),
            kind,
            &mut components.schemas,
            |m| Node::Schemas(m),
            Self::schema,
        )?;
        self.map(
            &path.child("parameters"),
            kind,
            &mut components.parameters,
            |m| Node::ParameterMap(m),
            Self::parameter,
        )?;
        self.map(
            &path.child("headers"),
            kind,
            &mut components.headers,
            |m| Node::Headers(m),
            Self::header,
        )?;
        self.map(
            &path.child("responses"),
            kind,
            &mut components.responses,
            |m| Node::Responses(m),
            Self::response,
        )?;
        self.map(
            &path.child("requestBodies"),
            kind,
            &mut components.request_bodies,
            |m| Node::RequestBodies(m),
            Self::request_body,
        )?;
        self.map(
            &path.child("links"),
            kind,
            &mut components.links,
            |m| Node::Links(m),
            Self::link,
        )?;
        self.map(
            &path.child("examples"),
            kind,
            &mut components.examples,
            |m| Node::Examples(m),
            Self::example,
        )?;
        self.map(
            &path.child("callbacks"),
            kind,
            &mut components.callbacks,
            |m| Node::Callbacks(m),
            Self::callback,
        )?;
        self.map(
            &path.child("securitySchemes"),
            kind,
            &mut components.security_schemes,
            |m| Node::SecuritySchemes(m),
            Self::security_scheme,
        )
    }

    fn path_item(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        item: &mut PathItem,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::PathItem(&mut *item))? {
            return Ok(());
        }
        let kind = NodeKind::PathItem;
        for (method, operation) in item.operations_mut() {
            if let Some(operation) = operation {
                self.operation(&path.child(method), kind, operation)?;
            }
        }
        self.servers(&path.child("servers"), kind, &mut item.servers)?;
        self.list(
            &path.child("parameters"),
            kind,
            &mut item.parameters,
            |l| Node::Parameters(l),
            Self::parameter,
        )
    }

    fn operation(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        op: &mut Operation,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Operation(&mut *op))? {
            return Ok(());
        }
        let kind = NodeKind::Operation;
        self.list(
            &path.child("parameters"),
            kind,
            &mut op.parameters,
            |l| Node::Parameters(l),
            Self::parameter,
        )?;
        self.servers(&path.child("servers"), kind, &mut op.servers)?;
        self.map(
            &path.child("responses"),
            kind,
            &mut op.responses,
            |m| Node::Responses(m),
            Self::response,
        )?;
        if let Some(security) = op.security.as_mut() {
            self.security(&path.child("security"), kind, security)?;
        }
        if let Some(body) = op.request_body.as_mut() {
            self.request_body(&path.child("requestBody"), kind, body)?;
        }
        self.map(
            &path.child("callbacks"),
            kind,
            &mut op.callbacks,
            |m| Node::Callbacks(m),
            Self::callback,
        )?;
        if let Some(docs) = op.external_docs.as_mut() {
            self.leaf(&path.child("externalDocs"), kind, Node::ExternalDocs(docs))?;
        }
        Ok(())
    }

    fn servers(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        servers: &mut Vec<Server>,
    ) -> Result<(), E> {
        self.list(path, parent, servers, |l| Node::Servers(l), Self::server)
    }

    fn server(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        server: &mut Server,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Server(&mut *server))? {
            return Ok(());
        }
        self.map(
            &path.child("variables"),
            NodeKind::Server,
            &mut server.variables,
            |m| Node::ServerVariables(m),
            |w, path, parent, variable| w.leaf(path, parent, Node::ServerVariable(variable)),
        )
    }

    fn security(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        requirements: &mut Vec<SecurityRequirement>,
    ) -> Result<(), E> {
        self.list(
            path,
            parent,
            requirements,
            |l| Node::SecurityRequirements(l),
            |w, path, parent, requirement| {
                w.leaf(path, parent, Node::SecurityRequirement(requirement))
            },
        )
    }

    fn tag(&mut self, path: &StructuralPath, parent: NodeKind, tag: &mut Tag) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Tag(&mut *tag))? {
            return Ok(());
        }
        if let Some(docs) = tag.external_docs.as_mut() {
            self.leaf(&path.child("externalDocs"), NodeKind::Tag, Node::ExternalDocs(docs))?;
        }
        Ok(())
    }

    fn parameter(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        parameter: &mut ParameterRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Parameter(&mut *parameter))? {
            return Ok(());
        }
        if !self.descend_into(parameter) {
            return Ok(());
        }
        let kind = NodeKind::Parameter;
        let parameter = &mut parameter.value;
        if let Some(schema) = parameter.schema.as_mut() {
            self.schema(&path.child("schema"), kind, schema)?;
        }
        self.map(
            &path.child("examples"),
            kind,
            &mut parameter.examples,
            |m| Node::Examples(m),
            Self::example,
        )?;
        self.map(
            &path.child("content"),
            kind,
            &mut parameter.content,
            |m| Node::Content(m),
            Self::media_type,
        )
    }

    fn header(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        header: &mut HeaderRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Header(&mut *header))? {
            return Ok(());
        }
        if !self.descend_into(header) {
            return Ok(());
        }
        let kind = NodeKind::Header;
        let header = &mut header.value;
        if let Some(schema) = header.schema.as_mut() {
            self.schema(&path.child("schema"), kind, schema)?;
        }
        self.map(
            &path.child("examples"),
            kind,
            &mut header.examples,
            |m| Node::Examples(m),
            Self::example,
        )?;
        self.map(
            &path.child("content"),
            kind,
            &mut header.content,
            |m| Node::Content(m),
            Self::media_type,
        )
    }

    fn response(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        response: &mut ResponseRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Response(&mut *response))? {
            return Ok(());
        }
        if !self.descend_into(response) {
            return Ok(());
        }
        let kind = NodeKind::Response;
        let response = &mut response.value;
        self.map(
            &path.child("headers"),
            kind,
            &mut response.headers,
            |m| Node::Headers(m),
            Self::header,
        )?;
        self.map(
            &path.child("content"),
            kind,
            &mut response.content,
            |m| Node::Content(m),
            Self::media_type,
        )?;
        self.map(
            &path.child("links"),
            kind,
            &mut response.links,
            |m| Node::Links(m),
            Self::link,
        )
    }

    fn request_body(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        body: &mut RequestBodyRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::RequestBody(&mut *body))? {
            return Ok(());
        }
        if !self.descend_into(body) {
            return Ok(());
        }
        self.map(
            &path.child("content"),
            NodeKind::RequestBody,
            &mut body.value.content,
            |m| Node::Content(m),
            Self::media_type,
        )
    }

    fn media_type(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        media: &mut MediaType,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::MediaType(&mut *media))? {
            return Ok(());
        }
        let kind = NodeKind::MediaType;
        if let Some(schema) = media.schema.as_mut() {
            self.schema(&path.child("schema"), kind, schema)?;
        }
        self.map(
            &path.child("examples"),
            kind,
            &mut media.examples,
            |m| Node::Examples(m),
            Self::example,
        )?;
        self.map(
            &path.child("encoding"),
            kind,
            &mut media.encoding,
            |m| Node::Encodings(m),
            Self::encoding,
        )
    }

    fn encoding(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        encoding: &mut Encoding,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Encoding(&mut *encoding))? {
            return Ok(());
        }
        self.map(
            &path.child("headers"),
            NodeKind::Encoding,
            &mut encoding.headers,
            |m| Node::Headers(m),
            Self::header,
        )
    }

    fn link(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        link: &mut LinkRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Link(&mut *link))? {
            return Ok(());
        }
        if !self.descend_into(link) {
            return Ok(());
        }
        let kind = NodeKind::Link;
        let link = &mut link.value;
        self.map(
            &path.child("parameters"),
            kind,
            &mut link.parameters,
            |m| Node::LinkParameters(m),
            |w, path, parent, value| w.leaf(path, parent, Node::LinkParameter(value)),
        )?;
        if let Some(server) = link.server.as_mut() {
            self.server(&path.child("server"), kind, server)?;
        }
        Ok(())
    }

    fn example(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        example: &mut ExampleRef,
    ) -> Result<(), E> {
        self.leaf(path, parent, Node::Example(example))
    }

    fn callback(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        callback: &mut CallbackRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Callback(&mut *callback))? {
            return Ok(());
        }
        if !self.descend_into(callback) {
            return Ok(());
        }
        for (expression, item) in callback.value.iter_mut() {
            self.path_item(&path.child(expression.as_str()), NodeKind::Callback, item)?;
        }
        Ok(())
    }

    fn security_scheme(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        scheme: &mut SecuritySchemeRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::SecurityScheme(&mut *scheme))? {
            return Ok(());
        }
        if !self.descend_into(scheme) {
            return Ok(());
        }
        let Some(flows) = scheme.value.flows.as_mut() else {
            return Ok(());
        };
        let path = path.child("flows");
        if !self.reachable(&path)
            || !self.visit(&path, NodeKind::SecurityScheme, Node::OAuthFlows(&mut *flows))?
        {
            return Ok(());
        }
        for (name, flow) in flows.flows_mut() {
            if let Some(flow) = flow {
                self.leaf(&path.child(name), NodeKind::OAuthFlows, Node::OAuthFlow(flow))?;
            }
        }
        Ok(())
    }

    fn schema(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        schema: &mut SchemaRef,
    ) -> Result<(), E> {
        if !self.reachable(path) || !self.visit(path, parent, Node::Schema(&mut *schema))? {
            return Ok(());
        }
        if !self.descend_into(schema) {
            return Ok(());
        }
        let kind = NodeKind::Schema;
        let schema = &mut schema.value;
        self.list(
            &path.child("oneOf"),
            kind,
            &mut schema.one_of,
            |l| Node::SchemaList(l),
            Self::schema,
        )?;
        self.list(
            &path.child("anyOf"),
            kind,
            &mut schema.any_of,
            |l| Node::SchemaList(l),
            Self::schema,
        )?;
        self.list(
            &path.child("allOf"),
            kind,
            &mut schema.all_of,
            |l| Node::SchemaList(l),
            Self::schema,
        )?;
        if let Some(not) = schema.not.as_deref_mut() {
            self.schema(&path.child("not"), kind, not)?;
        }
        self.map(
            &path.child("properties"),
            kind,
            &mut schema.properties,
            |m| Node::Schemas(m),
            Self::schema,
        )?;
        if let Some(items) = schema.items.as_deref_mut() {
            self.schema(&path.child("items"), kind, items)?;
        }
        if let Some(AdditionalProperties::Schema(additional)) =
            schema.additional_properties.as_mut()
        {
            self.schema(&path.child("additionalProperties"), kind, additional)?;
        }
        self.map(
            &path.child("extensions"),
            kind,
            &mut schema.extensions,
            |m| Node::Extensions(m),
            |w, path, parent, value| w.leaf(path, parent, Node::Extension(value)),
        )?;
        if let Some(discriminator) = schema.discriminator.as_mut() {
            self.discriminator(&path.child("discriminator"), kind, discriminator)?;
        }
        Ok(())
    }

    fn discriminator(
        &mut self,
        path: &StructuralPath,
        parent: NodeKind,
        discriminator: &mut Discriminator,
    ) -> Result<(), E> {
        if !self.reachable(path)
            || !self.visit(path, parent, Node::Discriminator(&mut *discriminator))?
        {
            return Ok(());
        }
        self.map(
            &path.child("mapping"),
            NodeKind::Discriminator,
            &mut discriminator.mapping,
            |m| Node::DiscriminatorMapping(m),
            |w, path, parent, target| w.leaf(path, parent, Node::MappingTarget(target)),
        )
    }
}

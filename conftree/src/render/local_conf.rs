use crate::{
    data::{Node, NodeValue, Tree, ValueTree},
    error::{Result, TemplateRenderError},
    render::fragment::Fragment,
};

/// First line of every generated document.
pub const LOCAL_CONF_HEADER: &str = "[[local|localrc]]";

impl Node<'_> {
    /// This node's own lines: plugin lines, then each non-empty fragment,
    /// preceded by a blank line and a `# description` comment.
    ///
    /// An unchecked checkbox contributes nothing of its own.
    fn own_lines(&self, data: &ValueTree) -> std::result::Result<Vec<String>, TemplateRenderError> {
        if self.kind().is_checkbox() && !self.value().as_bool() {
            return Ok(Vec::new());
        }
        let mut lines = self.kind().plugin_lines(self.name(), self.value());

        for template in self.templates() {
            let line = Fragment::parse(template)
                .and_then(|f| f.render(data))
                .map_err(|source| TemplateRenderError {
                    path: self.path().to_string(),
                    fragment: template.clone(),
                    source,
                })?;
            if !line.is_empty() {
                lines.push(line);
            }
        }

        if !lines.is_empty() {
            if let Some(desc) = self.description() {
                lines.insert(0, format!("# {desc}"));
                lines.insert(0, String::new());
            }
        }
        Ok(lines)
    }

    /// Pre-order contribution of this subtree, skipping inactive children.
    fn collect_lines(
        &self,
        data: &ValueTree,
        out: &mut Vec<String>,
    ) -> std::result::Result<(), TemplateRenderError> {
        out.extend(self.own_lines(data)?);
        collect_children(self.children().values(), self.value(), data, out)
    }
}

fn collect_children<'a, 's: 'a>(
    children: impl Iterator<Item = &'a Node<'s>>,
    parent_value: &NodeValue,
    data: &ValueTree,
    out: &mut Vec<String>,
) -> std::result::Result<(), TemplateRenderError> {
    for child in children {
        if !child.is_active_under(parent_value) {
            debug!("Skipping inactive subtree `{}`", child.path());
            continue;
        }
        child.collect_lines(data, out)?;
    }
    Ok(())
}

impl Tree<'_> {
    /// Render every active node's lines in declaration order.
    ///
    /// The value snapshot is taken once, at the start of the call.
    pub fn render_lines(&self) -> std::result::Result<Vec<String>, TemplateRenderError> {
        let data = self.flatten();
        let mut lines = Vec::new();
        // The root holds no value; top-level nodes never declare a condition.
        collect_children(self.children().values(), &NodeValue::Null, &data, &mut lines)?;
        Ok(lines)
    }

    /// The complete `local.conf` document.
    pub fn render(&self) -> std::result::Result<String, TemplateRenderError> {
        let lines = self.render_lines()?;
        let mut out = String::with_capacity(LOCAL_CONF_HEADER.len() + 1 + lines.len() * 32);
        out.push_str(LOCAL_CONF_HEADER);
        out.push('\n');
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Apply submitted values, then render.
    pub fn local_conf<I, K, V>(&mut self, values: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<serde_json::Value>,
    {
        self.set_values(values)?;
        Ok(self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{NodeSchema, Schema},
        error::{Error, FragmentError},
    };
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            NodeSchema::new("mysql", "boolean")
                .with_description("MySQL")
                .with_template("enable_service mysql"),
            NodeSchema::new("rabbitmq", "boolean")
                .with_description("RabbitMQ")
                .with_child(
                    NodeSchema::new("password", "string")
                        .with_description("RabbitMQ password")
                        .with_default("secret")
                        .with_template("RABBIT_PASSWORD={{ data[\"rabbitmq.password\"] }}")
                        .when_parent_is(true),
                ),
        ])
        .unwrap()
    }

    #[test]
    fn test_description_comment() {
        let schema = schema();
        let tree = Tree::build(&schema).unwrap();
        assert_eq!(
            tree.render_lines().unwrap(),
            vec![
                "",
                "# MySQL",
                "enable_service mysql",
                "",
                "# RabbitMQ password",
                "RABBIT_PASSWORD=secret",
            ]
        );
    }

    #[test]
    fn test_no_comment_without_output() {
        let schema = Schema::new(vec![
            NodeSchema::new("empty", "hidden")
                .with_description("Nothing")
                .with_template(""),
            NodeSchema::new("blank", "string").with_template("{{ data['blank'] }}"),
        ])
        .unwrap();
        let tree = Tree::build(&schema).unwrap();
        assert!(tree.render_lines().unwrap().is_empty());
        assert_eq!(tree.render().unwrap(), "[[local|localrc]]\n");
    }

    #[test]
    fn test_unchecked_checkbox_is_silent() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        tree.set_value("mysql", &json!(false)).unwrap();
        let lines = tree.render_lines().unwrap();
        assert!(!lines.iter().any(|l| l.contains("mysql") || l == "# MySQL"));
        assert!(lines.contains(&"RABBIT_PASSWORD=secret".to_string()));
    }

    #[test]
    fn test_children_of_unchecked_checkbox_may_render() {
        let schema = Schema::new(vec![
            NodeSchema::new("tls", "boolean")
                .with_default(false)
                .with_template("USE_SSL=True")
                .with_child(
                    NodeSchema::new("plain", "hidden")
                        .with_template("USE_SSL=False")
                        .when_parent_is(false),
                ),
        ])
        .unwrap();
        let mut tree = Tree::build(&schema).unwrap();
        assert_eq!(tree.render_lines().unwrap(), vec!["USE_SSL=False"]);
        tree.set_value("tls", &json!("on")).unwrap();
        assert_eq!(tree.render_lines().unwrap(), vec!["USE_SSL=True"]);
    }

    #[test]
    fn test_gated_subtree() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        tree.set_value("rabbitmq", &json!("0")).unwrap();
        let out = tree.render().unwrap();
        assert!(!out.contains("RABBIT_PASSWORD"));
        assert!(!out.contains("RabbitMQ password"));
    }

    #[test]
    fn test_render_error_aborts() {
        let schema = Schema::new(vec![
            NodeSchema::new("ok", "hidden").with_template("fine"),
            NodeSchema::new("bad", "hidden").with_template("{{ data['missing'] }}"),
        ])
        .unwrap();
        let tree = Tree::build(&schema).unwrap();
        let err = tree.render().unwrap_err();
        assert_eq!(err.path, "bad");
        assert_eq!(err.source, FragmentError::UnknownKey("missing".into()));
    }

    #[test]
    fn test_render_error_inside_inactive_subtree_is_ignored() {
        let schema = Schema::new(vec![
            NodeSchema::new("p", "boolean").with_default(false).with_child(
                NodeSchema::new("c", "hidden")
                    .with_template("{% if x %}")
                    .when_parent_is(true),
            ),
        ])
        .unwrap();
        let mut tree = Tree::build(&schema).unwrap();
        assert!(tree.render().is_ok());
        tree.set_value("p", &json!("on")).unwrap();
        assert!(tree.render().is_err());
    }

    #[test]
    fn test_local_conf_reports_unknown_path() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        let err = tree.local_conf([("nope", "1")]).unwrap_err();
        assert!(matches!(err, Error::UnknownPath(ref e) if e.path == "nope"));
    }

    #[test]
    fn test_plugin_rendering() {
        let mut plugin = NodeSchema::new("heat", "plugin").with_description("Heat");
        plugin.services = vec!["h-api".into(), "h-eng".into()];
        let schema = Schema::new(vec![plugin]).unwrap();
        let mut tree = Tree::build(&schema).unwrap();
        assert_eq!(
            tree.render().unwrap(),
            "[[local|localrc]]\n\n# Heat\n\
             enable_plugin heat https://git.openstack.org/openstack/heat.git\n\
             enable_service h-api,h-eng\n"
        );
        tree.set_value("heat", &json!("0")).unwrap();
        assert_eq!(tree.render().unwrap(), "[[local|localrc]]\n");
    }
}

#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Write `content` to a temporary file with the given extension.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn create_temp(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("switchyard_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_xml(content: &str) -> NamedTempFile {
        create_temp(content, "xml")
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp(content, "yaml")
    }
}

pub mod fixtures {
    /// Route document shared by the integration tests
    pub const SHOP_ROUTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<routes>
  <route>
    <options>
      <middleware value="session,csrf"/>
    </options>
    <get path="/" call="Home::index"/>
    <get path="/products/:slug(/:variant)" call="Products::show">
      <options>
        <where>
          <variant regexp="^[a-z]+$" default="standard"/>
        </where>
      </options>
    </get>
    <group prefix="/account">
      <options>
        <secure value="true"/>
        <middleware value="add:auth"/>
      </options>
      <get path="/orders" call="Orders::index"/>
      <resource path="/addresses" call="Addresses"/>
    </group>
    <group prefix="/api">
      <options>
        <middleware value="clear:*,add:api_key"/>
      </options>
      <controller path="/search" call="Search"/>
    </group>
    <domain host="static\.shop\.test">
      <get path="/assets" call="Assets::serve"/>
    </domain>
  </route>
</routes>
"#;
}

use dataconv::tree::{io_json, io_xml, io_yaml};
use dataconv::{Converter, Data, DataType};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn json_roundtrip_is_lossless(tree in proptest_helpers::arb_tree()) {
        let json = io_json::to_json_string(&tree).expect("write json");
        let restored = io_json::from_json_str(&json).expect("parse json");

        prop_assert_eq!(tree, restored);
    }

    #[test]
    fn pretty_json_parses_to_same_tree(tree in proptest_helpers::arb_tree()) {
        let compact = io_json::to_json_string(&tree).expect("write compact");
        let pretty = io_json::to_json_string_pretty(&tree).expect("write pretty");

        prop_assert_eq!(
            io_json::from_json_str(&compact).expect("parse compact"),
            io_json::from_json_str(&pretty).expect("parse pretty")
        );
    }

    #[test]
    fn yaml_roundtrip_is_lossless(tree in proptest_helpers::arb_tree()) {
        let yaml = io_yaml::to_yaml_string(&tree).expect("write yaml");
        let restored = io_yaml::from_yaml_str(&yaml).expect("parse yaml");

        prop_assert_eq!(tree, restored);
    }

    #[test]
    fn dict_to_xml_roundtrip_stringifies_scalars(tree in proptest_helpers::arb_xml_shaped_tree()) {
        let converter = Converter::with_type(Data::Dict(tree.clone()), DataType::Dict)
            .expect("accept dict");
        let xml = converter.to_xml().expect("write xml");
        let restored = io_xml::from_xml_str(&xml).expect("parse xml");

        prop_assert_eq!(restored, proptest_helpers::stringify_scalars(&tree));
    }

    #[test]
    fn xml_roundtrip_is_idempotent(tree in proptest_helpers::arb_tree()) {
        let first_xml = io_xml::to_xml_string(&tree).expect("write first pass");
        let first = io_xml::from_xml_str(&first_xml).expect("parse first pass");

        let second_xml = io_xml::to_xml_string(&first).expect("write second pass");
        let second = io_xml::from_xml_str(&second_xml).expect("parse second pass");

        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_output_reparses(tree in proptest_helpers::arb_tree()) {
        let converter = Converter::with_type(Data::Dict(tree), DataType::Dict)
            .expect("accept dict");

        let json = converter.to_json().expect("write json");
        let yaml = converter.to_yaml().expect("write yaml");
        let xml = converter.to_xml().expect("write xml");

        prop_assert!(Converter::new(json, "json").is_ok());
        prop_assert!(Converter::new(yaml, "yaml").is_ok());
        prop_assert!(Converter::new(xml, "xml").is_ok());
    }

    #[test]
    fn unsupported_type_always_fails(data in ".*", data_type in "[a-zA-Z]{0,8}") {
        prop_assume!(!["json", "xml", "dict", "yaml"].contains(&data_type.as_str()));

        let err = Converter::new(data, &data_type).unwrap_err();
        prop_assert_eq!(err.kind(), dataconv::ErrorKind::UnsupportedType);
    }
}

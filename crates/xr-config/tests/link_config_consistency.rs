//! Every credential a client reads from the share link must be present,
//! byte for byte, in the config the engine runs with.

use base64::Engine as _;
use serde_json::Value;
use xr_config::{build_config, encode_link, ProtocolVariant, RealityKeyMaterial, ServerIdentity};

fn identity() -> ServerIdentity {
    ServerIdentity::new("0b0f6a3e-2c4d-4e7a-9f51-8d2b3c4a5e6f", 31443, "198.51.100.20")
}

fn keys() -> RealityKeyMaterial {
    RealityKeyMaterial {
        private_key: "SMd0Q0w3dGd1cHlqYnRzZ2ZqZ2ZqZ2ZqZ2ZqZ2ZqZ2Y".into(),
        public_key: "Zr3bY9c7N8k1XbW2m0pQ4s6u8w0y2A4C6E8G0I2K4M6".into(),
        short_id: "a1b2c3d4e5f60718".into(),
    }
}

fn query_param<'a>(link: &'a str, key: &str) -> &'a str {
    let query = link
        .split_once('?')
        .map(|(_, q)| q)
        .and_then(|q| q.split('#').next())
        .expect("link has a query");
    query
        .split('&')
        .find_map(|kv| kv.strip_prefix(&format!("{key}=")))
        .unwrap_or_else(|| panic!("missing {key} in {link}"))
}

#[test]
fn vless_link_credentials_appear_in_config() {
    let variant = ProtocolVariant::VlessReality {
        dest: "www.lovelive-anime.jp:443".into(),
        server_names: vec!["www.lovelive-anime.jp".into()],
    };
    let cfg = build_config(&identity(), &variant, Some(&keys())).unwrap();
    let link = encode_link(&identity(), &variant, Some(&keys())).unwrap();
    let written = String::from_utf8(cfg.to_json_pretty().unwrap()).unwrap();

    let user = link
        .strip_prefix("vless://")
        .and_then(|rest| rest.split_once('@'))
        .map(|(id, _)| id)
        .unwrap();
    let port = link
        .split_once('?')
        .and_then(|(head, _)| head.rsplit_once(':'))
        .map(|(_, port)| port)
        .unwrap();

    for credential in [
        user,
        query_param(&link, "pbk"),
        query_param(&link, "sid"),
        query_param(&link, "sni"),
        query_param(&link, "flow"),
    ] {
        assert!(
            written.contains(&format!("\"{credential}\"")),
            "{credential} missing from config"
        );
    }
    assert!(written.contains(&format!("\"port\": {port}")));
}

#[test]
fn vmess_link_credentials_appear_in_config() {
    let cfg = build_config(&identity(), &ProtocolVariant::VMess, None).unwrap();
    let link = encode_link(&identity(), &ProtocolVariant::VMess, None).unwrap();
    let written: Value = serde_json::from_slice(&cfg.to_json_pretty().unwrap()).unwrap();

    let share: Value = serde_json::from_slice(
        &base64::engine::general_purpose::STANDARD
            .decode(link.trim_start_matches("vmess://"))
            .unwrap(),
    )
    .unwrap();

    let inbound = &written["inbounds"][0];
    assert_eq!(share["id"], inbound["settings"]["clients"][0]["id"]);
    assert_eq!(
        share["port"].as_str().unwrap(),
        inbound["port"].to_string()
    );
    assert_eq!(
        share["aid"].as_str().unwrap(),
        inbound["settings"]["clients"][0]["alterId"].to_string()
    );
    assert_eq!(share["type"], inbound["streamSettings"]["tcpSettings"]["header"]["type"]);
}

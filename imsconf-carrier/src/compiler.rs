//! Translation of a feature configuration into carrier config overrides.
//!
//! The compiled bundle is additive: an enabled feature sets its platform
//! keys, a disabled feature sets nothing and leaves the platform default in
//! charge. The only exceptions are the two "hide" flags VoLTE forces to
//! `false`.

use imsconf_types::keys;
use imsconf_types::{Bundle, Configuration, Feature, SubId};

/// Compiles `config` for `sub_id` and stamps it with `build_version`.
///
/// When `sub_id` is [`SubId::ALL`] the carrier name, country ISO and IMS user
/// agent are left out whatever their values.
pub fn compile(config: &Configuration, sub_id: SubId, build_version: i32) -> Bundle {
    let mut bundle = Bundle::new();

    if !sub_id.is_all() {
        compile_subscription_strings(config, &mut bundle);
    }

    if config.is_enabled(Feature::Volte) {
        bundle.put_bool(keys::CARRIER_VOLTE_AVAILABLE, true);
        bundle.put_bool(keys::EDITABLE_ENHANCED_4G_LTE, true);
        bundle.put_bool(keys::HIDE_ENHANCED_4G_LTE, false);
        bundle.put_bool(keys::HIDE_LTE_PLUS_DATA_ICON, false);
    }

    if config.is_enabled(Feature::VideoTelephony) {
        bundle.put_bool(keys::CARRIER_VT_AVAILABLE, true);
    }

    if config.is_enabled(Feature::Ut) {
        bundle.put_bool(keys::CARRIER_SUPPORTS_SS_OVER_UT, true);
    }

    if config.is_enabled(Feature::CrossSim) {
        bundle.put_bool(keys::CARRIER_CROSS_SIM_IMS_AVAILABLE, true);
        bundle.put_bool(keys::ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA, true);
    }

    if config.is_enabled(Feature::Vowifi) {
        bundle.put_bool(keys::CARRIER_WFC_IMS_AVAILABLE, true);
        bundle.put_bool(keys::CARRIER_WFC_SUPPORTS_WIFI_ONLY, true);
        bundle.put_bool(keys::EDITABLE_WFC_MODE, true);
        bundle.put_bool(keys::EDITABLE_WFC_ROAMING_MODE, true);
        bundle.put_bool(keys::SHOW_WIFI_CALLING_ICON_IN_STATUS_BAR, true);
        bundle.put_int(keys::WFC_SPN_FORMAT_IDX, keys::WFC_SPN_FORMAT);
    }

    if config.is_enabled(Feature::Vonr) {
        bundle.put_bool(keys::VONR_ENABLED, true);
        bundle.put_bool(keys::VONR_SETTING_VISIBILITY, true);
    }

    if config.is_enabled(Feature::Nr5g) {
        bundle.put_int_array(
            keys::CARRIER_NR_AVAILABILITIES,
            &[keys::NR_AVAILABILITY_NSA, keys::NR_AVAILABILITY_SA],
        );
        bundle.put_int_array(keys::NR_SSRSRP_THRESHOLDS, &keys::NR_SSRSRP_THRESHOLDS_DBM);
    }

    if config.is_enabled(Feature::Show4gForLte) {
        bundle.put_bool(keys::SHOW_4G_FOR_LTE_DATA_ICON, true);
    }

    bundle.set_config_version(build_version);
    bundle
}

fn compile_subscription_strings(config: &Configuration, bundle: &mut Bundle) {
    let carrier_name = config.text(Feature::CarrierName);
    if !carrier_name.is_empty() {
        bundle.put_bool(keys::CARRIER_NAME_OVERRIDE, true);
        bundle.put_string(keys::CARRIER_NAME, carrier_name);
    }

    let country_iso = config.text(Feature::CountryIso);
    if !country_iso.is_empty() {
        bundle.put_string(keys::SIM_COUNTRY_ISO_OVERRIDE, country_iso.to_lowercase());
    }

    let user_agent = config.text(Feature::ImsUserAgent);
    if !user_agent.is_empty() {
        bundle.put_string(keys::IMS_USER_AGENT, user_agent);
    }
}

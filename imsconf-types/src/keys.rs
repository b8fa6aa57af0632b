//! Carrier configuration keys understood by the platform.

/// Reserved key carrying the build version that produced an override.
pub const CONFIG_VERSION: &str = "config_version";

pub const CARRIER_VOLTE_AVAILABLE: &str = "carrier_volte_available_bool";
pub const EDITABLE_ENHANCED_4G_LTE: &str = "editable_enhanced_4g_lte_bool";
pub const HIDE_ENHANCED_4G_LTE: &str = "hide_enhanced_4g_lte_bool";
pub const HIDE_LTE_PLUS_DATA_ICON: &str = "hide_lte_plus_data_icon_bool";

pub const CARRIER_VT_AVAILABLE: &str = "carrier_vt_available_bool";

pub const CARRIER_SUPPORTS_SS_OVER_UT: &str = "carrier_supports_ss_over_ut_bool";

pub const CARRIER_CROSS_SIM_IMS_AVAILABLE: &str = "carrier_cross_sim_ims_available_bool";
pub const ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA: &str =
    "enable_cross_sim_calling_on_opportunistic_data_bool";

pub const CARRIER_WFC_IMS_AVAILABLE: &str = "carrier_wfc_ims_available_bool";
pub const CARRIER_WFC_SUPPORTS_WIFI_ONLY: &str = "carrier_wfc_supports_wifi_only_bool";
pub const EDITABLE_WFC_MODE: &str = "editable_wfc_mode_bool";
pub const EDITABLE_WFC_ROAMING_MODE: &str = "editable_wfc_roaming_mode_bool";
pub const SHOW_WIFI_CALLING_ICON_IN_STATUS_BAR: &str = "show_wifi_calling_icon_in_status_bar_bool";
pub const WFC_SPN_FORMAT_IDX: &str = "wfc_spn_format_idx_int";

pub const VONR_ENABLED: &str = "vonr_enabled_bool";
pub const VONR_SETTING_VISIBILITY: &str = "vonr_setting_visibility_bool";

pub const CARRIER_NR_AVAILABILITIES: &str = "carrier_nr_availabilities_int_array";
pub const NR_SSRSRP_THRESHOLDS: &str = "5g_nr_ssrsrp_thresholds_int_array";

pub const CARRIER_NAME_OVERRIDE: &str = "carrier_name_override_bool";
pub const CARRIER_NAME: &str = "carrier_name_string";
pub const SIM_COUNTRY_ISO_OVERRIDE: &str = "sim_country_iso_override_string";
pub const IMS_USER_AGENT: &str = "ims.ims_user_agent_string";

pub const SHOW_4G_FOR_LTE_DATA_ICON: &str = "show_4g_for_lte_data_icon_bool";

/// `CARRIER_NR_AVAILABILITY_NSA` on the platform.
pub const NR_AVAILABILITY_NSA: i32 = 1;
/// `CARRIER_NR_AVAILABILITY_SA` on the platform.
pub const NR_AVAILABILITY_SA: i32 = 2;

/// WFC SPN format index showing "%s Wi-Fi Calling".
pub const WFC_SPN_FORMAT: i32 = 6;

/// SS-RSRP boundaries (dBm) for poor, moderate, good and great.
pub const NR_SSRSRP_THRESHOLDS_DBM: [i32; 4] = [-128, -118, -108, -98];

/// Valid SS-RSRP range accepted by the platform, inclusive.
pub const NR_SSRSRP_RANGE_DBM: (i32, i32) = (-140, -44);
